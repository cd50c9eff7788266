//! Show how an author string parses.

use anyhow::Result;
use pagepress_core::StructuredName;
use serde::Serialize;

#[derive(Serialize)]
struct NameReport<'a> {
    raw: &'a str,
    parsed: bool,
    name: &'a StructuredName,
    full_name: String,
    surname_form: String,
}

pub fn show_name(raw: &str, json: bool) -> Result<()> {
    let name = StructuredName::parse(raw);
    let report = NameReport {
        raw,
        parsed: name.is_parsed(),
        name: &name,
        full_name: name.full_name(),
        surname_form: name.surname_form(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.parsed {
        println!("Could not parse {:?}", raw);
        return Ok(());
    }
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    println!("first:   {}", field(&name.first));
    println!("von:     {}", field(&name.von));
    println!("last:    {}", field(&name.last));
    println!("jr:      {}", field(&name.jr));
    println!("full:    {}", report.full_name);
    println!("surname: {}", report.surname_form);
    Ok(())
}
