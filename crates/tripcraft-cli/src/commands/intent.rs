//! Travel request parsing command

use anyhow::Result;

use tripcraft_core::intent::{render_query, IntentParser};

/// Parse a free-text travel request and print the extracted fields
pub fn cmd_parse(text: &str, render: bool) -> Result<()> {
    let parser = IntentParser::new()?;
    let request = parser.parse(text);

    println!("{}", serde_json::to_string_pretty(&request)?);

    if render {
        match render_query(&request) {
            Ok(query) => println!("\nPrompt: {}", query),
            Err(err) => println!("\nPrompt: ({})", err),
        }
    }

    Ok(())
}
