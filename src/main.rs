use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use onvif::{transport::HttpTransport, Device};
use onvif_probe::config::{Args, Command, ConfigFile, DeviceConfig};
use onvif_probe::tracing::init_tracer;
use serde::Serialize;
use serde_json::{json, Value};

fn to_json<T: Serialize>(result: onvif::Result<T>) -> anyhow::Result<Value> {
    let value = result?;
    Ok(serde_json::to_value(value)?)
}

/// Failed query is reported in place of its result so others are still printed
fn report<T: Serialize>(name: &str, result: onvif::Result<T>) -> Value {
    to_json(result).unwrap_or_else(|err| {
        tracing::error!("{name} failed: {err:#}");
        json!({ "Error": format!("{err:#}") })
    })
}

async fn run(device: &Device, command: Command) -> anyhow::Result<Value> {
    let output = match command {
        Command::Info => to_json(device.get_information().await)?,
        Command::DateTime => to_json(device.get_system_date_and_time().await)?,
        Command::Capabilities => to_json(device.get_capabilities().await)?,
        Command::DiscoveryMode => to_json(device.get_discovery_mode().await)?,
        Command::Scopes => to_json(device.get_scopes().await)?,
        Command::Hostname => to_json(device.get_hostname().await)?,
        Command::Dns => to_json(device.get_dns().await)?,
        Command::All => {
            let (info, date_time, capabilities, discovery_mode, scopes, hostname, dns) = tokio::join!(
                device.get_information(),
                device.get_system_date_and_time(),
                device.get_capabilities(),
                device.get_discovery_mode(),
                device.get_scopes(),
                device.get_hostname(),
                device.get_dns(),
            );
            json!({
                "DeviceInformation": report("GetDeviceInformation", info),
                "SystemDateAndTime": report("GetSystemDateAndTime", date_time),
                "Capabilities": report("GetCapabilities", capabilities),
                "DiscoveryMode": report("GetDiscoveryMode", discovery_mode),
                "Scopes": report("GetScopes", scopes),
                "HostnameInformation": report("GetHostname", hostname),
                "DNSInformation": report("GetDNS", dns),
            })
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let dotenv_path = dotenv();

    let config_path = args.config_path.clone().unwrap_or_else(ConfigFile::default_path);
    let config_file = ConfigFile::open(&config_path)?;
    let (file_config, config_status) = config_file.read()?;
    let config = DeviceConfig::resolve(&args, file_config, |key| std::env::var(key).ok())?;

    init_tracer(config.log_level.into());
    match dotenv_path {
        Ok(path) => tracing::info!("Loaded env variables from: {}", path.display()),
        Err(_) => tracing::debug!("Could not load env variables from dotfile"),
    }
    config_status.report(config_file.path());

    let transport = HttpTransport::with_timeout(&config.xaddr, config.timeout)
        .context("create http client")?;
    let device = Device::with_transport(transport, config.credentials);

    let output = run(&device, args.command)
        .await
        .with_context(|| format!("query {}", config.xaddr))?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
