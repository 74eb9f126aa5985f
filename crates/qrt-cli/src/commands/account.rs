//! Account command implementation.

use anyhow::Result;
use console::style;

use qrt_runtime::{AccountConfig, AccountStore, Channel};

/// Execute the account save subcommand.
pub fn execute_save(
    name: &str,
    channel: Channel,
    token: Option<String>,
    instance: Option<String>,
    overwrite: bool,
) -> Result<()> {
    let store = AccountStore::default_location()?;
    let mut config = AccountConfig::new(channel, token);
    if let Some(instance) = instance {
        config = config.with_instance(instance);
    }
    store.save_account(name, &config, overwrite)?;

    println!(
        "{} Saved account {} ({}) to {}",
        style("✓").green().bold(),
        style(name).green(),
        channel,
        style(store.path().display()).dim()
    );
    Ok(())
}

/// Execute the account show subcommand.
pub fn execute_show(name: Option<&str>) -> Result<()> {
    let store = AccountStore::default_location()?;
    let names = match name {
        Some(name) => vec![name.to_string()],
        None => store.accounts()?,
    };

    if names.is_empty() {
        println!(
            "{} No saved accounts in {}",
            style("○").dim(),
            store.path().display()
        );
        println!("  Run `qrt account save --token <TOKEN>` to add one");
        return Ok(());
    }

    println!("{} Saved accounts:\n", style("→").cyan().bold());
    for name in names {
        let config = store.load_account(&name)?;
        println!("  {} {}", style("●").green(), style(&name).bold());
        println!("    Channel: {}", config.channel);
        println!("    Token: {}", mask(config.token.as_deref()));
        if let Some(instance) = &config.instance {
            println!("    Instance: {instance}");
        }
        if let Some(url) = &config.url {
            println!("    URL: {url}");
        }
    }
    Ok(())
}

fn mask(token: Option<&str>) -> String {
    match token {
        None => "(none)".to_string(),
        Some(t) if t.chars().count() <= 4 => "****".to_string(),
        Some(t) => {
            let tail: String = t.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{tail}")
        }
    }
}
