use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;

use wayquery::classify::Classifier;
use wayquery::config::QueryProfile;
use wayquery::dsl::{evaluate_filter, parse_expr};
use wayquery::overpass::{assemble_query, compile_criteria};
use wayquery::region::Circle;
use wayquery::utils::{build_tag_map, parse_tag};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Filter expression (default: the profile's filter, or the road filter)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Query region as lat,lon[,radius], e.g. -37.8,144.9,10km
    #[arg(short, long, allow_hyphen_values = true)]
    pub region: Option<Circle>,

    /// Query profile (YAML)
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Print the compiled criteria as a JSON array instead of a query
    #[arg(long)]
    pub criteria: bool,

    /// Evaluate the filter against a tag (repeatable) and print the result
    #[arg(short, long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// With --tag, print primary/secondary/excluded instead of true/false
    #[arg(long, requires = "tags")]
    pub classify: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Merge command line flags over the profile (or the defaults).
pub fn resolve_profile(cli: &Cli) -> Result<QueryProfile> {
    let mut profile = match &cli.profile {
        Some(path) => QueryProfile::load(path)
            .with_context(|| format!("Config: Failed to load profile {:?}", path))?,
        None => QueryProfile::default(),
    };

    if let Some(filter) = &cli.filter {
        profile.filter = filter.clone();
    }
    if cli.region.is_some() {
        profile.region = cli.region;
    }
    Ok(profile)
}

pub fn run(cli: &Cli) -> Result<()> {
    let profile = resolve_profile(cli)?;
    tracing::info!("Filter: {}", profile.filter);

    if cli.classify {
        let classifier =
            Classifier::from_profile(&profile).context("Filter: Failed to parse expression")?;
        let tags = build_tag_map(cli.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        println!("{}", classifier.classify(&tags));
        return Ok(());
    }

    if !cli.tags.is_empty() {
        let ast = parse_expr(&profile.filter)
            .map_err(|e| anyhow!(e))
            .context("Filter: Failed to parse expression")?;
        let tags = build_tag_map(cli.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        println!("{}", evaluate_filter(&ast, &tags));
        return Ok(());
    }

    let criteria =
        compile_criteria(&profile.filter).context("Filter: Failed to compile expression")?;
    tracing::info!("Filter: {} criteria", criteria.len());

    if cli.criteria {
        let json = serde_json::to_string(&criteria).context("CLI: Failed to encode criteria")?;
        println!("{}", json);
        return Ok(());
    }

    let region = profile
        .query_region()
        .context("CLI: No region given; use --region or set one in the profile")?;
    tracing::info!("Region: {} (grown by {})", region, profile.grow);

    println!("{}", assemble_query(&region, &criteria));
    Ok(())
}
