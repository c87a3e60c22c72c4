//! Schema command - describe the resource types and data sources this
//! provider offers
//!
//! A name that is both a resource and a data source shows the resource.

use anyhow::Result;
use colored::Colorize;
use declarative::{DeletePolicy, ResourceSchema, SchemaRegistry};

use super::{data_sources, registry};
use crate::Context;

pub fn run(_ctx: &Context, type_name: Option<&str>) -> Result<()> {
    let registry = registry()?;
    let sources = data_sources()?;
    match type_name {
        Some(name) => show(registry.lookup(name).or_else(|_| sources.lookup(name))?),
        None => {
            list("Resource types", &registry)?;
            println!();
            list("Data sources", &sources)?;
        }
    }
    Ok(())
}

fn list(title: &str, registry: &SchemaRegistry) -> Result<()> {
    println!("{}", title.bold());
    for name in registry.type_names() {
        let schema = registry.lookup(name)?;
        println!("  {:<24} {}", name.cyan(), schema.api_name.dimmed());
    }
    Ok(())
}

fn show(schema: &ResourceSchema) {
    println!("{} {}", schema.type_name.bold(), format!("({})", schema.api_name).dimmed());
    println!("  {}: {}", "on destroy".dimmed(), delete_policy(&schema.delete_policy));
    if schema.refresh_after_write {
        println!("  {}: re-read after every write", "refresh".dimmed());
    }
    if let Some(reset) = &schema.password_reset {
        println!("  {}: when {} becomes true", "password reset".dimmed(), reset.trigger);
    }
    println!();

    for attr in &schema.attributes {
        let mut line = format!("  {:<28} {:<7} {}", attr.name.cyan(), attr.ty.to_string(), attr.flags());
        if !attr.local && attr.remote_name != attr.name {
            line.push_str(&format!("  {}", format!("→ {}", attr.remote_name).dimmed()));
        }
        if let Some(default) = &attr.default {
            line.push_str(&format!("  {}", format!("default {default}").dimmed()));
        }
        println!("{line}");
    }
}

fn delete_policy(policy: &DeletePolicy) -> String {
    match policy {
        DeletePolicy::Delete => "delete".to_string(),
        DeletePolicy::Deactivate { field } => format!("set {field} to false"),
    }
}
