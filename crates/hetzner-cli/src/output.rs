//! Output formatting for CLI commands
//!
//! Lists render as aligned columns, single resources as a key/value view, and
//! both as pretty JSON with `--output json`.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use hetzner_api::{
    Action,
    auction::AuctionServer,
    cloud::{Image, Location, Server, ServerType, SshKey},
    responses::CreateServerResponse,
    robot::{ResetOptions, ResetResult, RobotIp, RobotServer, RobotSshKey},
};

use crate::cli::Format;

/// A row in a list view
pub trait TableRow {
    /// Column headers
    fn headers() -> &'static [&'static str];
    /// Cells, one per header
    fn row(&self) -> Vec<String>;
}

/// A single resource shown as `key: value` lines
pub trait Detail {
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Writes command results in the selected format
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: Format,
}

impl Output {
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a list of resources
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn list<W, T>(&self, writer: &mut W, items: &[T]) -> eyre::Result<()>
    where
        W: Write,
        T: Serialize + TableRow,
    {
        match self.format {
            Format::Json => write_json(writer, items),
            Format::Table => {
                let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();
                writer.write_all(render_table(T::headers(), &rows).as_bytes())?;
                Ok(())
            }
        }
    }

    /// Write a single resource
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn detail<W, T>(&self, writer: &mut W, item: &T) -> eyre::Result<()>
    where
        W: Write,
        T: Serialize + Detail,
    {
        match self.format {
            Format::Json => write_json(writer, item),
            Format::Table => {
                writer.write_all(render_detail(&item.fields()).as_bytes())?;
                Ok(())
            }
        }
    }

    /// Write a confirmation; JSON output gets `{"message": ...}`
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn message<W: Write>(&self, writer: &mut W, message: &str) -> eyre::Result<()> {
        match self.format {
            Format::Json => write_json(writer, &serde_json::json!({ "message": message })),
            Format::Table => {
                writeln!(writer, "{message}")?;
                Ok(())
            }
        }
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> eyre::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Render rows as left-aligned columns separated by two spaces
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    push_line(&mut out, &header, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        line.push_str(cell);
        if i + 1 < widths.len() {
            line.push_str(&" ".repeat(width - cell.width() + 2));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render `key: value` lines with aligned values
pub fn render_detail(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    fields
        .iter()
        .map(|(key, value)| {
            let pad = " ".repeat(width - key.width());
            format!("{key}:{pad} {value}\n")
        })
        .collect()
}

fn timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

fn labels(labels: &std::collections::BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return "-".to_string();
    }
    labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

// Cloud

impl TableRow for Server {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "STATUS", "TYPE", "IPV4", "LOCATION", "AGE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.to_string(),
            self.server_type.name.clone(),
            or_dash(self.public_net.ipv4.as_ref().map(|ip| ip.ip.as_str())),
            self.datacenter.location.name.clone(),
            age(&self.created),
        ]
    }
}

impl Detail for Server {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Name", self.name.clone()),
            ("Status", self.status.to_string()),
            ("Created", timestamp(&self.created)),
            (
                "Server type",
                format!(
                    "{} ({} cores, {} GB RAM, {} GB disk)",
                    self.server_type.name,
                    self.server_type.cores,
                    self.server_type.memory,
                    self.server_type.disk
                ),
            ),
            ("Datacenter", self.datacenter.name.clone()),
            (
                "Location",
                format!(
                    "{} ({}, {})",
                    self.datacenter.location.name,
                    self.datacenter.location.city,
                    self.datacenter.location.country
                ),
            ),
            (
                "IPv4",
                or_dash(self.public_net.ipv4.as_ref().map(|ip| ip.ip.as_str())),
            ),
            (
                "IPv6",
                or_dash(self.public_net.ipv6.as_ref().map(|ip| ip.ip.as_str())),
            ),
            (
                "Image",
                or_dash(
                    self.image
                        .as_ref()
                        .map(|i| i.name.as_deref().unwrap_or(&i.description)),
                ),
            ),
            ("Labels", labels(&self.labels)),
            ("Locked", self.locked.to_string()),
        ]
    }
}

impl Detail for CreateServerResponse {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = self.server.fields();
        fields.push((
            "Action",
            format!("{} ({})", self.action.id, self.action.status),
        ));
        if let Some(password) = &self.root_password {
            fields.push(("Root password", password.clone()));
        }
        fields
    }
}

/// Coarse age of a resource: `5m`, `3h`, `12d`
fn age(created: &DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(*created);
    if elapsed.num_days() > 0 {
        format!("{}d", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}m", elapsed.num_minutes().max(0))
    }
}

impl TableRow for Action {
    fn headers() -> &'static [&'static str] {
        &["ID", "COMMAND", "STATUS", "PROGRESS", "STARTED", "RESOURCES"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.command.clone(),
            self.status.to_string(),
            format!("{}%", self.progress),
            timestamp(&self.started),
            resources(self),
        ]
    }
}

fn resources(action: &Action) -> String {
    if action.resources.is_empty() {
        return "-".to_string();
    }
    action
        .resources
        .iter()
        .map(|r| format!("{}:{}", r.resource_type, r.id))
        .collect::<Vec<_>>()
        .join(",")
}

impl Detail for Action {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("ID", self.id.to_string()),
            ("Command", self.command.clone()),
            ("Status", self.status.to_string()),
            ("Progress", format!("{}%", self.progress)),
            ("Started", timestamp(&self.started)),
            ("Finished", self.finished.as_ref().map_or_else(|| "-".to_string(), timestamp)),
            ("Resources", resources(self)),
        ];
        if let Some(error) = &self.error {
            fields.push(("Error", format!("{}: {}", error.code, error.message)));
        }
        fields
    }
}

impl TableRow for SshKey {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "FINGERPRINT", "CREATED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.fingerprint.clone(),
            timestamp(&self.created),
        ]
    }
}

impl Detail for SshKey {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Name", self.name.clone()),
            ("Fingerprint", self.fingerprint.clone()),
            ("Created", timestamp(&self.created)),
            ("Labels", labels(&self.labels)),
            ("Public key", self.public_key.clone()),
        ]
    }
}

impl TableRow for Image {
    fn headers() -> &'static [&'static str] {
        &["ID", "TYPE", "NAME", "DESCRIPTION", "ARCH", "STATUS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.image_type.clone(),
            or_dash(self.name.as_deref()),
            self.description.clone(),
            self.architecture.clone(),
            self.status.clone(),
        ]
    }
}

impl TableRow for Location {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "DESCRIPTION", "COUNTRY", "CITY", "NETWORK ZONE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone(),
            self.country.clone(),
            self.city.clone(),
            self.network_zone.clone(),
        ]
    }
}

impl TableRow for ServerType {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "CORES", "CPU", "ARCH", "MEMORY", "DISK"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.cores.to_string(),
            self.cpu_type.clone(),
            self.architecture.clone(),
            format!("{} GB", self.memory),
            format!("{} GB", self.disk),
        ]
    }
}

// Robot

impl TableRow for RobotServer {
    fn headers() -> &'static [&'static str] {
        &["NUMBER", "NAME", "PRODUCT", "DC", "IP", "STATUS", "PAID UNTIL"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.server_number.to_string(),
            or_dash(Some(self.server_name.as_str())),
            self.product.clone(),
            self.dc.clone(),
            or_dash(self.server_ip.as_deref()),
            self.status.clone(),
            or_dash(Some(self.paid_until.as_str())),
        ]
    }
}

impl Detail for RobotServer {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Number", self.server_number.to_string()),
            ("Name", or_dash(Some(self.server_name.as_str()))),
            ("Product", self.product.clone()),
            ("Datacenter", self.dc.clone()),
            ("Status", self.status.clone()),
            ("IPv4", or_dash(self.server_ip.as_deref())),
            ("IPv6 net", or_dash(self.server_ipv6_net.as_deref())),
            ("IPs", or_dash(Some(self.ip.join(", ").as_str()))),
            ("Traffic", self.traffic.clone()),
            ("Cancelled", self.cancelled.to_string()),
            ("Paid until", or_dash(Some(self.paid_until.as_str()))),
        ]
    }
}

impl Detail for ResetOptions {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Server", self.server_number.to_string()),
            ("IPv4", or_dash(self.server_ip.as_deref())),
            ("Reset types", self.reset_types.join(", ")),
            ("Operating status", or_dash(self.operating_status.as_deref())),
        ]
    }
}

impl Detail for ResetResult {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Server", self.server_number.to_string()),
            ("IPv4", or_dash(self.server_ip.as_deref())),
            ("Reset type", self.reset_type.clone()),
        ]
    }
}

impl TableRow for RobotIp {
    fn headers() -> &'static [&'static str] {
        &["IP", "SERVER", "SERVER IP", "LOCKED", "SEPARATE MAC"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.ip.clone(),
            self.server_number.to_string(),
            or_dash(self.server_ip.as_deref()),
            self.locked.to_string(),
            or_dash(self.separate_mac.as_deref()),
        ]
    }
}

impl TableRow for RobotSshKey {
    fn headers() -> &'static [&'static str] {
        &["NAME", "FINGERPRINT", "TYPE", "SIZE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.fingerprint.clone(),
            self.key_type.clone(),
            self.size.to_string(),
        ]
    }
}

// Auction

impl TableRow for AuctionServer {
    fn headers() -> &'static [&'static str] {
        &["ID", "PRICE", "CPU", "RAM", "DISKS", "DATACENTER", "SPECIALS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            format!("{:.2} EUR", self.price),
            self.cpu.clone(),
            format!("{} GB", self.ram_size),
            format!("{}x ({} GB)", self.hdd_count, self.hdd_size),
            self.datacenter.clone(),
            or_dash(Some(self.specials.join(", ").as_str())),
        ]
    }
}
