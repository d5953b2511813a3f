use crate::*;

pub fn handle_catalog_commands(cli: &Cli, config: &ZooConfig) -> anyhow::Result<bool> {
    let reader = CatalogReader::open(cli.root.clone());

    match &cli.command {
        Commands::Validate { strict } => {
            let strict = *strict || config.validate.strict;
            let report = validate_catalog(&cli.root, strict);
            let ok = report.is_ok();
            print_outcome(cli.json, ok, &report, |r| r.to_string())?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Resolve {
            model,
            version,
            artifact,
        } => {
            let selector = parse_selector(version)?;
            let desc = reader.resolve_version(model, selector)?;
            if *artifact {
                let path = reader.artifact_path(model, VersionSelector::Number(desc.version))?;
                print_one(
                    cli.json,
                    VersionDescriptor {
                        path,
                        ..desc
                    },
                    |d| d.path.display().to_string(),
                )?;
            } else {
                print_one(cli.json, desc, |d| d.path.display().to_string())?;
            }
        }
        Commands::Show { model, version } => {
            let selector = parse_selector(version)?;
            let meta = reader.load_model_metadata(model, selector)?;
            let text = render_document(&meta, DocFormat::Yaml)?;
            print_one(cli.json, meta, |_| text.trim_end().to_string())?;
        }
        Commands::List { model } => match model {
            Some(name) => {
                let listing = reader.listing(name)?;
                print_one(cli.json, listing, |l| {
                    l.versions
                        .iter()
                        .map(|v| {
                            if Some(*v) == l.latest {
                                format!("v{}\tlatest", v)
                            } else {
                                format!("v{}", v)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            None => {
                let mut listings = Vec::new();
                for name in reader.list_models()? {
                    listings.push(reader.listing(&name)?);
                }
                print_out(cli.json, &listings, |l| {
                    let versions: Vec<String> =
                        l.versions.iter().map(|v| format!("v{}", v)).collect();
                    let latest = l
                        .latest
                        .map(|v| format!("v{}", v))
                        .unwrap_or_else(|| "-".to_string());
                    format!("{}\t{}\t{}", l.name, latest, versions.join(","))
                })?;
            }
        },
        _ => return Ok(false),
    }

    Ok(true)
}

fn parse_selector(raw: &str) -> anyhow::Result<VersionSelector> {
    raw.parse::<VersionSelector>()
        .map_err(|e| CatalogError::InvalidArgument(e).into())
}
