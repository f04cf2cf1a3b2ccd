use bloodbank::{RequestStatus, Resource, domain::DashboardStats};
use clap::Parser;
use tracing::instrument;

use super::{
    OutputFormat, Session, print_json,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show donor, stock and request totals")]
pub struct Dashboard {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

impl Dashboard {
    #[instrument(level = "debug", skip(session))]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        if !session
            .load(&[Resource::Statistics, Resource::Hospitals])
            .await
        {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let stats = cache.statistics().cloned().unwrap_or_default();
        let hospitals = cache.hospitals().list().len();
        drop(cache);

        match self.output {
            OutputFormat::Json => Self::output_json(&stats, hospitals)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&stats, hospitals),
            OutputFormat::Table => Self::output_table(&stats, hospitals),
        }
        Ok(())
    }

    fn output_json(stats: &DashboardStats, hospitals: usize) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "statistics": stats,
            "total_hospitals": hospitals,
        });
        print_json(&output)
    }

    fn output_quiet(stats: &DashboardStats, hospitals: usize) {
        println!(
            "donors={} available={} pending={} hospitals={hospitals}",
            stats.donors.total_donors,
            stats.blood_banks.available_units,
            stats.requests.pending_requests,
        );
    }

    fn output_table(stats: &DashboardStats, hospitals: usize) {
        println!("Dashboard");
        println!("{}", "─────────".dim());

        let totals = [
            ("Total donors", stats.donors.total_donors.to_string()),
            ("Donations", stats.donors.total_donations.to_string()),
            (
                "Available units",
                stats.blood_banks.available_units.to_string().success(),
            ),
            ("Blood banks", stats.blood_banks.total_banks.to_string()),
            ("Total hospitals", hospitals.to_string()),
        ];
        for (label, value) in totals {
            println!("{label:<16} {value}");
        }

        let expiring = stats.blood_banks.expiring_soon;
        if expiring > 0 {
            println!(
                "{:<16} {} ⚠️",
                "Expiring soon",
                expiring.to_string().warning()
            );
        }
        let pending = stats.requests.pending_requests;
        if pending > 0 {
            println!("{:<16} {}", "Pending requests", pending.to_string().info());
            println!("{}", "Run 'bbreq allocate' to allocate units.".dim());
        } else {
            println!("{:<16} {} ✅", "Pending requests", "0".success());
        }

        println!();
        println!("Requests by status");
        let headers: Vec<&str> = RequestStatus::ALL.iter().map(|status| status.as_str()).collect();
        let counts = RequestStatus::ALL
            .iter()
            .map(|status| stats.requests.count(*status).to_string())
            .collect();
        terminal::print_table(&headers, &[counts]);

        if !stats.donors.by_blood_group.is_empty() {
            println!();
            println!("Donors by blood group");
            let rows: Vec<Vec<String>> = stats
                .donors
                .by_blood_group
                .iter()
                .map(|group| vec![group.blood_group.clone(), group.count.to_string()])
                .collect();
            terminal::print_table(&["Group", "Donors"], &rows);
        }
    }
}
