//! `localize` subcommand

use super::{GlobalArgs, build_unblocker, init_logging, load_settings, print_json};
use crate::{Message, types::SiteTarget};
use anyhow::{Result, bail};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct LocalizeArgs {
    /// Full host name of the page, e.g. `www.crunchyroll.com`
    pub host: Option<String>,
    pub subdomain: Option<String>,
    pub extension: Option<String>,
}

/// Resolve the target from either `--host` or `--subdomain`/`--extension`
pub fn resolve_target(args: &LocalizeArgs, base_host: &str) -> Result<SiteTarget> {
    match (&args.host, &args.extension) {
        (Some(host), None) => Ok(SiteTarget::from_hostname(host, base_host)?),
        (None, Some(extension)) => Ok(SiteTarget::new(
            args.subdomain.clone().unwrap_or_default(),
            extension.clone(),
        )),
        (Some(_), Some(_)) => bail!("--host cannot be combined with --extension"),
        (None, None) => bail!("either --host or --extension is required"),
    }
}

pub async fn run_localize(global: GlobalArgs, args: LocalizeArgs) -> Result<()> {
    let settings = load_settings(&global)?;
    init_logging(&settings);

    let target = resolve_target(&args, &settings.site.base_host)?;
    info!("Localizing {}", target.domain(&settings.site.base_host));

    let unblocker = build_unblocker(settings)?;
    let reply = unblocker
        .dispatch(Message::LocalizeToUs {
            subdomain: target.subdomain,
            extension: target.extension,
            logged_in: false,
        })
        .await?;
    print_json(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_host() {
        let args = LocalizeArgs {
            host: Some("beta.crunchyroll.com".to_string()),
            ..Default::default()
        };
        let target = resolve_target(&args, "crunchyroll").unwrap();
        assert_eq!(target, SiteTarget::new("beta.", ".com"));
    }

    #[test]
    fn test_target_from_parts() {
        let args = LocalizeArgs {
            extension: Some(".co.uk".to_string()),
            ..Default::default()
        };
        let target = resolve_target(&args, "crunchyroll").unwrap();
        assert_eq!(target, SiteTarget::new("", ".co.uk"));
    }

    #[test]
    fn test_target_requires_one_source() {
        assert!(resolve_target(&LocalizeArgs::default(), "crunchyroll").is_err());
    }
}
