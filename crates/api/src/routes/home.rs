//! Landing page listing the available tools.

use askama::Template;
use axum::extract::State;

use crate::state::AppState;

/// Landing page template.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub tools: Vec<ToolRow>,
}

/// One row of the tool table.
pub struct ToolRow {
    pub name: String,
    pub description: String,
}

/// Render the landing page.
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    let tools = state
        .registry
        .get_descriptions()
        .into_iter()
        .map(|(name, description)| ToolRow {
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect();

    HomeTemplate { tools }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_text_is_escaped() {
        let page = HomeTemplate {
            tools: vec![ToolRow {
                name: "echo".to_string(),
                description: r#"Says "<hi>" & 'bye'"#.to_string(),
            }],
        }
        .render()
        .unwrap();

        assert!(page.contains("<code>echo</code>"));
        assert!(page.contains("&lt;hi&gt;"));
        assert!(page.contains("&amp;"));
        assert!(!page.contains(r#""<hi>""#));
    }
}
