use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;

use wxpub::{Config, TemplateData, TemplateMessageSender, WxPubClient};

#[derive(Parser)]
#[command(name = "wxpub")]
#[command(about = "Send one WeChat official-account template message")]
struct Cli {
    /// Recipient openid
    open_id: String,

    /// Registered template id
    template_id: String,

    /// Template data, e.g. '{"first":{"value":"hi","color":"#173177"}}'
    #[arg(value_parser = parse_data)]
    data: TemplateData,

    /// Page opened when the message is tapped
    #[arg(long)]
    url: Option<String>,

    /// Mini-program page opened when the message is tapped
    #[arg(long)]
    page: Option<String>,
}

fn parse_data(raw: &str) -> Result<TemplateData, String> {
    serde_json::from_str(raw).map_err(|e| format!("expected a JSON object of objects: {e}"))
}

impl Cli {
    fn apply(&self, msg: &mut TemplateMessageSender) {
        if let Some(url) = &self.url {
            msg.set_redirect_url(url.as_str());
        }
        if let Some(page) = &self.page {
            msg.set_mp_path(page.as_str());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load local .env if present (no-op in prod/systemd envs)
    let _ = dotenvy::dotenv();

    let cfg = Config::from_env()?;
    wxpub::monitoring::init_tracing(cfg.log_json);
    info!(?cfg, "boot");

    let token = cfg
        .access_token
        .clone()
        .ok_or_else(|| anyhow!("WXPUB_ACCESS_TOKEN is required"))?;

    let client = WxPubClient::from_config(&cfg)?;
    let mut msg = client.template_message(cli.open_id.as_str());
    msg.set_access_token(token);
    cli.apply(&mut msg);

    let msg_id = msg.send(&cli.template_id, &cli.data).await?;
    info!(msg_id, "sent");
    println!("{msg_id}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DATA: &str = r#"{"first":{"value":"hi"}}"#;

    fn client() -> WxPubClient {
        let cfg = Config {
            wxmp_app_id: Some("wx-mini".into()),
            ..Config::default()
        };
        WxPubClient::from_config(&cfg).unwrap()
    }

    #[test]
    fn parses_positionals_and_flags() {
        let cli = Cli::try_parse_from([
            "wxpub",
            "open-1",
            "tpl-1",
            DATA,
            "--url",
            "https://a.example",
            "--page",
            "pages/index",
        ])
        .unwrap();

        assert_eq!(cli.open_id, "open-1");
        assert_eq!(cli.template_id, "tpl-1");
        assert_eq!(cli.data["first"]["value"], "hi");

        let mut msg = client().template_message(cli.open_id.as_str());
        cli.apply(&mut msg);
        let body = msg.request_body(&cli.template_id, &cli.data).unwrap();
        assert_eq!(body["url"], "https://a.example");
        assert_eq!(body["miniprogram"], json!({"appid": "wx-mini", "pagepath": "pages/index"}));
    }

    #[test]
    fn flags_are_optional() {
        let cli = Cli::try_parse_from(["wxpub", "open-1", "tpl-1", DATA]).unwrap();

        let mut msg = client().template_message(cli.open_id.as_str());
        cli.apply(&mut msg);
        let body = msg.request_body(&cli.template_id, &cli.data).unwrap();
        let obj = body.as_object().unwrap();
        assert!(!obj.contains_key("url"));
        assert!(!obj.contains_key("miniprogram"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Cli::try_parse_from(["wxpub", "open-1", "tpl-1"]).is_err());
        assert!(Cli::try_parse_from(["wxpub", "open-1", "tpl-1", "[1,2]"]).is_err());
        // Values must be attribute maps, not bare strings.
        let flat = r#"{"first":"hi"}"#;
        assert!(Cli::try_parse_from(["wxpub", "open-1", "tpl-1", flat]).is_err());
        let unknown = ["wxpub", "open-1", "tpl-1", DATA, "--color", "red"];
        assert!(Cli::try_parse_from(unknown).is_err());
        assert!(Cli::try_parse_from(["wxpub", "open-1", "tpl-1", DATA, "--url"]).is_err());
    }
}
