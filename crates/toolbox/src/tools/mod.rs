//! Built-in tool implementations.

mod delivery;
mod gmail;
mod google;
mod google_docs;
mod google_sheets;
mod ip_lookup;
pub mod location;
mod phone;
mod screenshot;
mod speech;
mod twilio;
mod unit_converter;
pub mod us_states;
mod verify_token;
mod weather;
mod web_search;
mod whatsapp;

pub use gmail::SendEmail;
pub use google_docs::{CreateGoogleDoc, ReadGoogleDoc};
pub use google_sheets::{AppendGoogleSheet, CreateGoogleSheet, ReadGoogleSheet};
pub use ip_lookup::IpLookup;
pub use location::{LocationQuery, LocationResolver, ResolveLocation, Resolution};
pub use phone::ParsePhoneNumber;
pub use screenshot::CaptureScreenshot;
pub use speech::{SpeechToText, TextToSpeech};
pub use twilio::{MakeCall, SendSms};
pub use unit_converter::{UnitCategory, UnitConverter};
pub use verify_token::VerifyToken;
pub use weather::Weather;
pub use web_search::WebSearch;
pub use whatsapp::SendWhatsapp;
