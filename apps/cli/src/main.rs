use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use client_core::{HttpRenderBackend, StampClient, StampEvent};
use shared::protocol::ConfigUpdate;
use tracing::info;

mod config;

/// Stamp QR codes and barcodes onto a template and export a numbered PDF.
#[derive(Parser, Debug)]
#[command(name = "pagestamp")]
struct Args {
    /// Render service base URL; overrides pagestamp.toml and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Template image or PDF to stamp.
    #[arg(long)]
    template: PathBuf,
    /// Where to write the exported document.
    #[arg(long, default_value = "generated_codes.pdf")]
    output: PathBuf,
    /// Optionally wait for the live preview and write its first page here.
    #[arg(long)]
    preview_out: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    start: i64,
    #[arg(long, default_value_t = 10)]
    end: i64,
    #[arg(long, default_value = "")]
    prefix: String,
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    qr: bool,
    #[arg(long, action = clap::ArgAction::Set, default_value_t = false)]
    barcode: bool,
    #[arg(long, action = clap::ArgAction::Set, default_value_t = false)]
    qr_text: bool,
    #[arg(long, action = clap::ArgAction::Set, default_value_t = false)]
    barcode_text: bool,
    #[arg(long)]
    qr_size: Option<u32>,
    #[arg(long)]
    qr_x: Option<u32>,
    #[arg(long)]
    qr_y: Option<u32>,
    #[arg(long)]
    barcode_width: Option<u32>,
    #[arg(long)]
    barcode_height: Option<u32>,
    #[arg(long)]
    barcode_x: Option<u32>,
    #[arg(long)]
    barcode_y: Option<u32>,
    #[arg(long)]
    text_offset_y: Option<u32>,
}

fn config_updates(args: &Args) -> Vec<ConfigUpdate> {
    let mut updates = vec![
        ConfigUpdate::StartValue(args.start),
        ConfigUpdate::EndValue(args.end),
        ConfigUpdate::Prefix(args.prefix.clone()),
        ConfigUpdate::IncludeQr(args.qr),
        ConfigUpdate::IncludeBarcode(args.barcode),
        ConfigUpdate::ShowQrText(args.qr_text),
        ConfigUpdate::ShowBarcodeText(args.barcode_text),
    ];
    if let Some(v) = args.qr_size {
        updates.push(ConfigUpdate::QrSize(v));
    }
    if let Some(v) = args.qr_x {
        updates.push(ConfigUpdate::QrX(v));
    }
    if let Some(v) = args.qr_y {
        updates.push(ConfigUpdate::QrY(v));
    }
    if let Some(v) = args.barcode_width {
        updates.push(ConfigUpdate::BarcodeWidth(v));
    }
    if let Some(v) = args.barcode_height {
        updates.push(ConfigUpdate::BarcodeHeight(v));
    }
    if let Some(v) = args.barcode_x {
        updates.push(ConfigUpdate::BarcodeX(v));
    }
    if let Some(v) = args.barcode_y {
        updates.push(ConfigUpdate::BarcodeY(v));
    }
    if let Some(v) = args.text_offset_y {
        updates.push(ConfigUpdate::TextOffsetY(v));
    }
    updates
}

/// Strips a `data:image/...;base64,` prefix when present and decodes the rest.
fn decode_data_url(payload: &str) -> Result<Vec<u8>> {
    let encoded = payload
        .rsplit_once(',')
        .map(|(_, data)| data)
        .unwrap_or(payload);
    STANDARD
        .decode(encoded)
        .context("preview payload is not valid base64")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = config::load_settings();
    let server_url = args
        .server_url
        .clone()
        .unwrap_or_else(|| settings.server_url.clone());

    let backend = Arc::new(HttpRenderBackend::new(server_url.clone()));
    let client = StampClient::new_with_quiet_period(backend, settings.preview_quiet);
    let mut events = client.subscribe_events();

    let limit = client.refresh_limits().await;
    info!(server_url = %server_url, max_pages = limit, "render service ready");

    let bytes = fs::read(&args.template)
        .with_context(|| format!("failed to read template '{}'", args.template.display()))?;
    let filename = args
        .template
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());
    let dimensions = client.upload_template(&filename, bytes).await?;
    println!(
        "template accepted: {}x{} px",
        dimensions.width, dimensions.height
    );

    for update in config_updates(&args) {
        client.apply_update(update).await;
    }

    if let Some(preview_out) = &args.preview_out {
        loop {
            match events.recv().await? {
                StampEvent::PreviewUpdated(snapshot) => {
                    let image = snapshot
                        .image
                        .context("preview settled without an image")?;
                    fs::write(preview_out, decode_data_url(&image)?)?;
                    println!(
                        "preview (first of {} pages) written to {}",
                        snapshot.total_pages,
                        preview_out.display()
                    );
                    break;
                }
                StampEvent::PreviewFailed(err) => return Err(err.into()),
                _ => {}
            }
        }
    }

    let document = client.export().await?;
    fs::write(&args.output, &document).with_context(|| {
        format!("failed to write document to '{}'", args.output.display())
    })?;
    println!(
        "wrote {} bytes to {}",
        document.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_data_url_strips_prefix() {
        let decoded = decode_data_url("data:image/png;base64,aGVsbG8=").expect("decode");
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn decode_data_url_accepts_bare_base64() {
        let decoded = decode_data_url("aGVsbG8=").expect("decode");
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn geometry_flags_are_only_applied_when_given() {
        let args = Args::parse_from(["pagestamp", "--template", "t.png", "--qr-size", "120"]);
        let updates = config_updates(&args);
        assert!(updates.contains(&ConfigUpdate::QrSize(120)));
        assert!(!updates.iter().any(|u| matches!(u, ConfigUpdate::QrX(_))));
    }
}
