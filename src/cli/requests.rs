use bloodbank::{
    ManualStatus, Notice, NewRequest, Request, RequestId, RequestPatch, Resource,
    domain::{Action, selection::selectable_requests},
    lifecycle::LifecycleError,
};
use clap::Parser;
use tracing::instrument;

use super::{OutputFormat, Session, cell, print_json, terminal};

#[derive(Debug, Parser)]
pub struct Requests {
    #[command(subcommand)]
    command: RequestsCommand,
}

#[derive(Debug, Parser)]
enum RequestsCommand {
    /// List blood requests
    List {
        /// Show only requests that can be allocated (status Pending)
        #[arg(long)]
        selectable: bool,

        /// Output format (default: table)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Create a blood request. New requests start Pending.
    Create {
        /// Patient the blood is for
        #[arg(long, value_name = "ID")]
        patient: i64,

        /// Blood bank to draw from
        #[arg(long, value_name = "ID")]
        bank: i64,

        /// Number of units required
        #[arg(long, value_name = "N", default_value_t = 1)]
        units: i64,
    },

    /// Edit a Pending request
    Edit {
        /// The request to edit
        id: RequestId,

        /// Replacement patient
        #[arg(long, value_name = "ID")]
        patient: Option<i64>,

        /// Replacement blood bank
        #[arg(long, value_name = "ID")]
        bank: Option<i64>,

        /// Replacement number of units
        #[arg(long, value_name = "N")]
        units: Option<i64>,
    },

    /// Delete a Pending request
    Delete {
        /// The request to delete
        id: RequestId,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Mark a request Fulfilled or Denied
    Status {
        /// The request to update
        id: RequestId,

        /// The new status
        #[arg(value_enum)]
        status: StatusArg,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StatusArg {
    Fulfilled,
    Denied,
}

impl From<StatusArg> for ManualStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Fulfilled => Self::Fulfilled,
            StatusArg::Denied => Self::Denied,
        }
    }
}

impl Requests {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        match self.command {
            RequestsCommand::List { selectable, output } => {
                Self::list(session, selectable, output).await?;
            }
            RequestsCommand::Create {
                patient,
                bank,
                units,
            } => Self::create(session, patient, bank, units).await,
            RequestsCommand::Edit {
                id,
                patient,
                bank,
                units,
            } => {
                let result = Self::edit(session, id, patient, bank, units).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Request updated successfully!".to_string(),
                    "Error updating request",
                ));
            }
            RequestsCommand::Delete { id, yes } => Self::delete(session, id, yes).await?,
            RequestsCommand::Status { id, status } => {
                if !session.load(&[Resource::Requests]).await {
                    return Ok(());
                }
                let result = session.lifecycle().update_status(id, status.into()).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Request status updated!".to_string(),
                    "Error updating status",
                ));
            }
        }
        Ok(())
    }

    async fn list(
        session: &mut Session,
        selectable: bool,
        output: OutputFormat,
    ) -> anyhow::Result<()> {
        if !session.load(&[Resource::Requests]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let all = cache.requests().list();
        let requests: Vec<&Request> = if selectable {
            selectable_requests(all).collect()
        } else {
            all.iter().collect()
        };

        match output {
            OutputFormat::Json => print_json(&requests)?,
            OutputFormat::Table if requests.is_empty() => {
                println!("No requests found. Create one with 'bbreq requests create'.");
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = requests
                    .iter()
                    .map(|request| {
                        vec![
                            request.id().to_string(),
                            cell(request.patient_name()),
                            cell(request.blood_group()),
                            request.required_units().to_string(),
                            cell(request.blood_bank_name()),
                            cell(request.hospital_name()),
                            terminal::status_label(request.status()),
                            request.request_date().format("%Y-%m-%d %H:%M").to_string(),
                        ]
                    })
                    .collect();
                terminal::print_table(
                    &[
                        "ID", "Patient", "Group", "Units", "Bank", "Hospital", "Status", "Date",
                    ],
                    &rows,
                );
            }
        }
        Ok(())
    }

    async fn create(session: &mut Session, patient: i64, bank: i64, units: i64) {
        let result = match NewRequest::from_form(patient, bank, units) {
            Ok(request) => session.lifecycle().create_request(request).await,
            Err(error) => Err(error.into()),
        };
        session.notify(Notice::from_result(
            &result,
            |_| "Request created successfully!".to_string(),
            "Error creating request",
        ));
    }

    async fn edit(
        session: &Session,
        id: RequestId,
        patient: Option<i64>,
        bank: Option<i64>,
        units: Option<i64>,
    ) -> Result<(), LifecycleError> {
        let patch = RequestPatch::from_form(patient, bank, units)?;
        let lifecycle = session.lifecycle();
        lifecycle.open_edit(id).await?;
        lifecycle.edit_request(id, patch).await
    }

    async fn delete(session: &mut Session, id: RequestId, yes: bool) -> anyhow::Result<()> {
        if !session.load(&[Resource::Requests]).await {
            return Ok(());
        }
        // Only ask for confirmation when the delete could go ahead.
        let allowed = session.lifecycle().check(id, Action::Delete).await;
        if allowed.is_err() {
            session.notify(Notice::from_result(
                &allowed,
                |_| String::new(),
                "Error deleting request",
            ));
            return Ok(());
        }
        if !yes && !terminal::confirm(&format!("Delete request {id}?"))? {
            println!("Cancelled.");
            return Ok(());
        }

        let result = session.lifecycle().delete_request(id).await;
        session.notify(Notice::from_result(
            &result,
            |_| "Request deleted successfully!".to_string(),
            "Error deleting request",
        ));
        Ok(())
    }
}
