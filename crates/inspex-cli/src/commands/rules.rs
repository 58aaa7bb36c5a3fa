//! Rules command - list the field rules of each report layout.

use clap::Args;
use console::style;

use inspex_core::models::record::DocumentType;
use inspex_core::RuleSet;

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    /// Only show one layout (type_1 or type_2)
    #[arg(short = 't', long = "type")]
    document_type: Option<DocumentType>,
}

pub async fn run(args: RulesArgs) -> anyhow::Result<()> {
    let types: Vec<DocumentType> = match args.document_type {
        Some(DocumentType::Unknown) => {
            anyhow::bail!("Unrecognized documents have no field rules")
        }
        Some(document_type) => vec![document_type],
        None => DocumentType::KNOWN.to_vec(),
    };

    for (i, document_type) in types.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_rule_set(RuleSet::for_type(document_type));
    }

    Ok(())
}

fn print_rule_set(rule_set: &RuleSet) {
    println!(
        "{} ({}, {} fields)",
        style(rule_set.document_type().description()).bold(),
        rule_set.document_type(),
        rule_set.len()
    );

    let width = rule_set
        .rules()
        .iter()
        .map(|rule| rule.field().len())
        .max()
        .unwrap_or(0);

    for (i, rule) in rule_set.rules().iter().enumerate() {
        println!(
            "  {:>2}. {:width$}  {:9}  {}",
            i + 1,
            rule.field(),
            rule.kind().name(),
            style(rule.anchors().join(" → ")).dim(),
            width = width
        );
    }
}
