//! Blood units, allocations, inventory and donations.

use bloodbank::{
    Notice, Resource,
    domain::{DonationForm, selection::selectable_units},
};
use clap::Parser;
use tracing::instrument;

use super::{
    OutputFormat, Session, cell, print_json,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
pub struct Units {
    #[command(subcommand)]
    command: UnitsCommand,
}

#[derive(Debug, Parser)]
enum UnitsCommand {
    /// List blood units
    List {
        /// Show only units that can be allocated (status Available)
        #[arg(long)]
        available: bool,

        /// Output format (default: table)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },
}

impl Units {
    #[instrument(level = "debug", skip(session))]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        let UnitsCommand::List { available, output } = self.command;
        if !session.load(&[Resource::Units]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let all = cache.units().list();
        let units: Vec<_> = if available {
            selectable_units(all).collect()
        } else {
            all.iter().collect()
        };

        match output {
            OutputFormat::Json => print_json(&units)?,
            OutputFormat::Table if units.is_empty() => {
                println!("No blood units found. Record a donation with 'bbreq donate'.");
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = units
                    .iter()
                    .map(|unit| {
                        vec![
                            unit.id.to_string(),
                            unit.blood_group.clone(),
                            unit.component.clone(),
                            if unit.is_available() {
                                unit.status.to_string()
                            } else {
                                unit.status.to_string().dim()
                            },
                            cell(unit.blood_bank_id),
                            cell(unit.expiration_date),
                        ]
                    })
                    .collect();
                terminal::print_table(
                    &["ID", "Group", "Component", "Status", "Bank", "Expires"],
                    &rows,
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Allocations {
    #[command(subcommand)]
    command: AllocationsCommand,
}

#[derive(Debug, Parser)]
enum AllocationsCommand {
    /// List allocations, most recent first
    List {
        /// Output format (default: table)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },
}

impl Allocations {
    #[instrument(level = "debug", skip(session))]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        let AllocationsCommand::List { output } = self.command;
        if !session.load(&[Resource::Allocations]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let mut allocations: Vec<_> = cache.allocations().list().iter().collect();
        allocations.sort_by(|a, b| b.allocation_date.cmp(&a.allocation_date));

        match output {
            OutputFormat::Json => print_json(&allocations)?,
            OutputFormat::Table if allocations.is_empty() => println!("No allocations yet."),
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = allocations
                    .iter()
                    .map(|allocation| {
                        vec![
                            allocation.id.to_string(),
                            allocation.request_id.to_string(),
                            allocation.unit_id.to_string(),
                            cell(allocation.patient_name.as_deref()),
                            cell(allocation.blood_group.as_deref()),
                            cell(allocation.component.as_deref()),
                            cell(allocation.blood_bank_name.as_deref()),
                            allocation
                                .allocation_date
                                .format("%Y-%m-%d %H:%M")
                                .to_string(),
                        ]
                    })
                    .collect();
                terminal::print_table(
                    &[
                        "ID",
                        "Request",
                        "Unit",
                        "Patient",
                        "Group",
                        "Component",
                        "Bank",
                        "Date",
                    ],
                    &rows,
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Inventory {
    /// Output format (default: table)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Inventory {
    #[instrument(level = "debug", skip(session))]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        if !session.load(&[Resource::Inventory]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let lines = cache.inventory().list();

        match self.output {
            OutputFormat::Json => print_json(&lines)?,
            OutputFormat::Table if lines.is_empty() => println!("No stock available."),
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = lines
                    .iter()
                    .map(|line| {
                        let expiry = match line.days_until_expiry {
                            Some(days) if days <= 7 => format!("{days} days").warning(),
                            Some(days) => format!("{days} days"),
                            None => cell(None::<i64>),
                        };
                        vec![
                            line.blood_bank_name.clone(),
                            line.blood_group.clone(),
                            line.total_units.to_string(),
                            line.total_quantity.to_string(),
                            expiry,
                        ]
                    })
                    .collect();
                terminal::print_table(
                    &["Bank", "Group", "Units", "Quantity", "Next expiry"],
                    &rows,
                );
            }
        }
        Ok(())
    }
}

/// Command arguments for `bbreq donate`.
#[derive(Debug, Parser)]
pub struct Donate {
    /// The donor
    #[arg(long, value_name = "ID")]
    donor: i64,

    /// The blood bank receiving the donation
    #[arg(long, value_name = "ID")]
    bank: i64,

    /// Blood component (Whole Blood, RBC, Plasma, Platelets)
    #[arg(long, default_value = "Whole Blood")]
    component: String,

    /// Number of units donated
    #[arg(long, value_name = "N", default_value_t = 1)]
    quantity: i64,
}

impl Donate {
    #[instrument(level = "debug", skip(session))]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        let form = DonationForm {
            donor_id: self.donor,
            blood_bank_id: self.bank,
            component: self.component,
            quantity: self.quantity,
        };
        let result = session.lifecycle().record_donation(&form).await;
        session.notify(Notice::from_result(
            &result,
            |_| "Donation recorded successfully!".to_string(),
            "Error recording donation",
        ));
        Ok(())
    }
}
