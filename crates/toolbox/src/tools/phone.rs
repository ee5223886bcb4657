//! Phone number parsing and formatting (libphonenumber metadata).

use async_trait::async_trait;
use phonenumber::{country, Mode, PhoneNumber};
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// `parsePhoneNumber`: `{phoneNumber, country?}`.
///
/// `country` is an ISO 3166-1 alpha-2 region used when the number has no
/// leading `+`. Numbers that parse but fail validation still return their
/// formats with `valid: false`.
pub struct ParsePhoneNumber;

impl ParsePhoneNumber {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParsePhoneNumber {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_region(region: &str) -> Result<country::Id, ToolError> {
    region
        .to_uppercase()
        .parse::<country::Id>()
        .map_err(|_| ToolError::invalid("country", format!("unknown region '{}'", region)))
}

fn describe(number: &PhoneNumber) -> Value {
    let valid = phonenumber::is_valid(number);
    let region = number.country().id().map(|id| format!("{:?}", id));

    json!({
        "status": true,
        "valid": valid,
        "e164": number.format().mode(Mode::E164).to_string(),
        "international": number.format().mode(Mode::International).to_string(),
        "national": number.format().mode(Mode::National).to_string(),
        "rfc3966": number.format().mode(Mode::Rfc3966).to_string(),
        "countryCode": number.code().value(),
        "region": region,
    })
}

#[async_trait]
impl Tool for ParsePhoneNumber {
    fn name(&self) -> &str {
        "parsePhoneNumber"
    }

    fn description(&self) -> &str {
        "Parses a phone number and returns its validity, E.164, international and national \
         formats, calling code and region. Pass country (ISO code) for numbers without +."
    }

    fn required_params(&self) -> &[&str] {
        &["phoneNumber"]
    }

    fn demo_body(&self) -> Value {
        json!({ "phoneNumber": "(202) 456-1111", "country": "US" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "valid": true,
            "e164": "+12024561111",
            "international": "+1 202-456-1111",
            "national": "(202) 456-1111",
            "rfc3966": "tel:+1-202-456-1111",
            "countryCode": 1,
            "region": "US"
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let raw = args.get_string("phoneNumber")?;
        let region = args
            .get_string_opt("country")
            .map(|c| parse_region(&c))
            .transpose()?;

        let number = phonenumber::parse(region, &raw)
            .map_err(|e| ToolError::invalid("phoneNumber", e.to_string()))?;

        Ok(ToolOutput::success(describe(&number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(value: Value) -> Result<ToolOutput, ToolError> {
        ParsePhoneNumber::new()
            .execute(ToolArgs::from_value(value).unwrap())
            .await
    }

    #[tokio::test]
    async fn test_national_number_with_region() {
        let output = parse(json!({"phoneNumber": "(202) 456-1111", "country": "us"}))
            .await
            .unwrap();

        assert_eq!(output.content["valid"], true);
        assert_eq!(output.content["e164"], "+12024561111");
        assert_eq!(output.content["countryCode"], 1);
        assert_eq!(output.content["region"], "US");
    }

    #[tokio::test]
    async fn test_international_number_without_region() {
        let output = parse(json!({"phoneNumber": "+44 20 7219 3000"})).await.unwrap();

        assert_eq!(output.content["e164"], "+442072193000");
        assert_eq!(output.content["countryCode"], 44);
        assert_eq!(output.content["region"], "GB");
    }

    #[tokio::test]
    async fn test_parsing_is_deterministic() {
        let body = json!({"phoneNumber": "2024561111", "country": "US"});
        let first = parse(body.clone()).await.unwrap();
        let second = parse(body).await.unwrap();
        assert_eq!(first.content, second.content);
    }

    #[tokio::test]
    async fn test_unknown_region_is_rejected() {
        let err = parse(json!({"phoneNumber": "2024561111", "country": "ZZZ"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_garbage_is_rejected() {
        let err = parse(json!({"phoneNumber": "not a number"})).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
