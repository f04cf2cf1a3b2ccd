use bloodbank::{
    Notice, RequestId, Resource, UnitId,
    domain::selection::{selectable_requests, selectable_units},
    lifecycle::ALLOCATION_FAILED,
};
use clap::Parser;
use tracing::instrument;

use super::{Session, terminal};

/// Command arguments for `bbreq allocate`.
///
/// Missing arguments are prompted for, offering only Pending requests and
/// Available units.
#[derive(Debug, Parser)]
pub struct Allocate {
    /// The request to allocate to
    request: Option<RequestId>,

    /// The blood unit to allocate
    unit: Option<UnitId>,
}

impl Allocate {
    #[instrument(level = "debug", skip(session))]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        if !session.load(&[Resource::Requests, Resource::Units]).await {
            return Ok(());
        }

        let request = match self.request {
            Some(id) => id,
            None => {
                let choices = Self::request_choices(session).await;
                if choices.is_empty() {
                    session.notify(Notice::error("No pending requests to allocate"));
                    return Ok(());
                }
                let Some(id) = Self::pick("Request", choices)? else {
                    println!("Cancelled.");
                    return Ok(());
                };
                id
            }
        };

        let unit = match self.unit {
            Some(id) => id,
            None => {
                let choices = Self::unit_choices(session).await;
                if choices.is_empty() {
                    session.notify(Notice::error("No available blood units"));
                    return Ok(());
                }
                let Some(id) = Self::pick("Blood unit", choices)? else {
                    println!("Cancelled.");
                    return Ok(());
                };
                id
            }
        };

        let spinner = terminal::spinner(format!("Allocating unit {unit} to request {request}"));
        let result = session.lifecycle().attempt_allocation(request, unit).await;
        spinner.finish_and_clear();

        let notice = match &result {
            Ok(outcome) => {
                if let Some(allocation) = outcome.allocation() {
                    tracing::info!(%allocation, "allocation recorded");
                }
                Notice::from(outcome)
            }
            Err(error) => Notice::error(error.user_message(ALLOCATION_FAILED)),
        };
        session.notify(notice);
        Ok(())
    }

    async fn request_choices(session: &Session) -> Vec<(RequestId, String)> {
        let cache = session.lifecycle().repository().cache().await;
        selectable_requests(cache.requests().list())
            .map(|request| {
                let label = format!(
                    "#{} {} ({}, {} units) at {}",
                    request.id(),
                    request.patient_name().unwrap_or("unknown patient"),
                    request.blood_group().unwrap_or("?"),
                    request.required_units(),
                    request.blood_bank_name().unwrap_or("unknown bank"),
                );
                (request.id(), label)
            })
            .collect()
    }

    async fn unit_choices(session: &Session) -> Vec<(UnitId, String)> {
        let cache = session.lifecycle().repository().cache().await;
        selectable_units(cache.units().list())
            .map(|unit| {
                let expires = unit
                    .expiration_date
                    .map_or_else(String::new, |date| format!(", expires {date}"));
                let label = format!(
                    "#{} {} {}{expires}",
                    unit.id, unit.blood_group, unit.component
                );
                (unit.id, label)
            })
            .collect()
    }

    fn pick<T: Copy>(prompt: &str, choices: Vec<(T, String)>) -> anyhow::Result<Option<T>> {
        let (ids, labels): (Vec<T>, Vec<String>) = choices.into_iter().unzip();
        Ok(terminal::choose(prompt, &labels)?.map(|index| ids[index]))
    }
}
