//! relalg CLI - SQL / TRC / RA-AST to relational-algebra translator.

mod catalog_file;
mod cli;
mod input;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use relalg_core::trc::TrcExpr;
use relalg_core::{translate_ra_ast, translate_sql, translate_trc, RaAst, TranslateOptions};
use std::process::ExitCode;

use cli::{Args, Command};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("relalg: error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let (tree, warnings) = match &args.command {
        Command::Trc { file, catalog } => {
            let catalog = catalog_file::load_catalog(catalog)?;
            let text = input::read_text(file.as_deref())?;
            let ast: TrcExpr = serde_json::from_str(&text).context("Failed to parse TRC AST JSON")?;
            translate_trc(&ast, &catalog, &TranslateOptions::default())?
        }
        Command::Sql {
            query,
            catalog,
            dialect,
        } => {
            let catalog = catalog_file::load_catalog(catalog)?;
            let query = match query {
                Some(q) => q.clone(),
                None => input::read_text(None)?,
            };
            translate_sql(&query, (*dialect).into(), &catalog, &TranslateOptions::default())?
        }
        Command::RaAst { file, catalog } => {
            let catalog = catalog_file::load_catalog(catalog)?;
            let text = input::read_text(file.as_deref())?;
            let ast: RaAst = serde_json::from_str(&text).context("Failed to parse RA AST JSON")?;
            translate_ra_ast(&ast, &catalog)?
        }
    };

    if !args.quiet {
        for warning in &warnings {
            eprintln!("relalg: warning: {}", warning.message);
        }
    }

    let rendered = if args.json {
        render::render_json(&tree)?
    } else {
        render::render_tree(&tree)
    };
    println!("{rendered}");

    Ok(())
}
