use crate::*;
use std::path::Path;

fn read_input_document(path: &Path) -> anyhow::Result<serde_json::Value> {
    let format = DocFormat::from_path(path).ok_or_else(|| {
        anyhow::anyhow!(
            "{}: expected a .yaml, .yml or .json document",
            path.display()
        )
    })?;
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    parse_document(&raw, format).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
}

pub fn handle_publish_commands(cli: &Cli, config: &ZooConfig) -> anyhow::Result<bool> {
    let publisher = Publisher::new(cli.root.clone());

    match &cli.command {
        Commands::Publish {
            model,
            artifact,
            metadata,
            schema,
            version,
            no_promote,
        } => {
            let metadata = parse_metadata(&read_input_document(metadata)?).map_err(|issues| {
                anyhow::anyhow!("{}: {}", metadata.display(), issues.join("; "))
            })?;
            let schema = parse_feature_schema(&read_input_document(schema)?)
                .map_err(|issues| anyhow::anyhow!("{}: {}", schema.display(), issues.join("; ")))?;

            let published = publisher.publish(
                model,
                PublishRequest {
                    artifact: artifact.clone(),
                    metadata,
                    schema,
                    version: *version,
                    promote: !no_promote,
                },
            )?;

            let message = format!("Publish {} v{}", published.model, published.version);
            let mirror_report = if config.mirror.push {
                Some(mirror(&cli.root, &config.mirror, &GitCli, &message)?)
            } else {
                None
            };

            let report = PublishReport {
                model: published.model,
                version: published.version,
                path: published.path,
                latest: published.latest,
                sha256: published.sha256,
                mirror: mirror_report,
            };
            print_one(cli.json, report, |r| {
                format!(
                    "published {}/v{} (latest: v{})",
                    r.model, r.version, r.latest
                )
            })?;
        }
        Commands::Promote { model, version } => {
            let index = publisher.promote(model, *version)?;
            print_one(cli.json, index, |i| {
                format!("{} latest -> v{}", i.model_name, i.latest.version)
            })?;
        }
        Commands::Mirror { message } => {
            let report = mirror(&cli.root, &config.mirror, &GitCli, message)?;
            print_one(cli.json, report, |r| {
                if !r.enabled {
                    return "git push disabled (set MODELZOO_GIT_PUSH=1)".to_string();
                }
                r.pushes
                    .iter()
                    .map(|p| {
                        let status = if p.ok { "ok" } else { "failed" };
                        format!("{}\t{}\tattempts={}", p.remote, status, p.attempts)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        _ => return Ok(false),
    }

    Ok(true)
}
