//! Print the compliance rule catalog.

use clap::Args;

use esglens_rules::catalog::{Rule, CATALOG};

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Emit the catalog as JSON (with default enabled/threshold values).
    #[arg(long)]
    pub json: bool,
}

pub fn run_rules(args: &RulesArgs) -> anyhow::Result<()> {
    if args.json {
        let rules: Vec<Rule> = CATALOG.iter().map(Rule::from).collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    for def in &CATALOG {
        println!(
            "{:3} {:13} {} — {}",
            def.id,
            def.category.as_str(),
            def.name,
            def.description
        );
    }
    Ok(())
}
