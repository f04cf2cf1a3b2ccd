//! Donors, patients, hospitals and blood banks.

use bloodbank::{
    Notice, Resource,
    domain::{
        BloodBankForm, DEFAULT_BANK_CAPACITY, DonorId, HospitalForm, PatientId,
        people::{DonorEdit, DonorForm, PatientEdit, PatientForm},
    },
};
use clap::Parser;
use tracing::instrument;

use super::{OutputFormat, Session, cell, print_json, terminal};

#[derive(Debug, Parser)]
pub struct Donors {
    #[command(subcommand)]
    command: DonorsCommand,
}

#[derive(Debug, Parser)]
enum DonorsCommand {
    /// List donors
    List {
        /// Output format (default: table)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Register a donor
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        /// Age in years (18 to 65)
        #[arg(long)]
        age: i64,

        /// M, F or O
        #[arg(long)]
        gender: String,

        /// Blood group, e.g. O+ or AB-
        #[arg(long = "blood-group", value_name = "GROUP")]
        blood_group: String,

        /// Ten digit phone number
        #[arg(long)]
        contact: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Update a donor's details
    Edit {
        /// The donor to update
        id: DonorId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<i64>,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },
}

impl Donors {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        match self.command {
            DonorsCommand::List { output } => Self::list(session, output).await?,
            DonorsCommand::Add {
                name,
                age,
                gender,
                blood_group,
                contact,
                email,
                address,
            } => {
                let form = DonorForm {
                    name,
                    age,
                    gender,
                    blood_group,
                    contact,
                    email,
                    address,
                };
                let result = session.lifecycle().add_donor(&form).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Donor added successfully!".to_string(),
                    "Error adding donor",
                ));
            }
            DonorsCommand::Edit {
                id,
                name,
                age,
                gender,
                contact,
                email,
                address,
            } => {
                let edit = DonorEdit {
                    name,
                    age,
                    gender,
                    contact,
                    email,
                    address,
                };
                let result = session.lifecycle().edit_donor(id, &edit).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Donor updated successfully!".to_string(),
                    "Error updating donor",
                ));
            }
        }
        Ok(())
    }

    async fn list(session: &mut Session, output: OutputFormat) -> anyhow::Result<()> {
        if !session.load(&[Resource::Donors]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let donors = cache.donors().list();

        match output {
            OutputFormat::Json => print_json(&donors)?,
            OutputFormat::Table if donors.is_empty() => {
                println!("No donors registered. Add one with 'bbreq donors add'.");
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = donors
                    .iter()
                    .map(|donor| {
                        vec![
                            donor.id.to_string(),
                            donor.name.clone(),
                            donor.age.to_string(),
                            donor.gender.clone(),
                            donor.blood_group.clone(),
                            donor.contact.clone(),
                            donor.total_donations.to_string(),
                            cell(donor.last_donation_date),
                        ]
                    })
                    .collect();
                terminal::print_table(
                    &[
                        "ID",
                        "Name",
                        "Age",
                        "Gender",
                        "Group",
                        "Contact",
                        "Donations",
                        "Last donated",
                    ],
                    &rows,
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Patients {
    #[command(subcommand)]
    command: PatientsCommand,
}

#[derive(Debug, Parser)]
enum PatientsCommand {
    /// List patients
    List {
        /// Output format (default: table)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Register a patient
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        /// Age in years (0 to 120)
        #[arg(long)]
        age: i64,

        /// M, F or O
        #[arg(long)]
        gender: String,

        /// Blood group, e.g. O+ or AB-
        #[arg(long = "blood-group", value_name = "GROUP")]
        blood_group: String,

        /// The admitting hospital
        #[arg(long, value_name = "ID")]
        hospital: i64,

        /// Ten digit phone number
        #[arg(long)]
        contact: String,

        /// Medical condition
        #[arg(long)]
        condition: Option<String>,
    },

    /// Update a patient's details
    Edit {
        /// The patient to update
        id: PatientId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<i64>,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long = "blood-group", value_name = "GROUP")]
        blood_group: Option<String>,

        #[arg(long, value_name = "ID")]
        hospital: Option<i64>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        condition: Option<String>,
    },
}

impl Patients {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        match self.command {
            PatientsCommand::List { output } => Self::list(session, output).await?,
            PatientsCommand::Add {
                name,
                age,
                gender,
                blood_group,
                hospital,
                contact,
                condition,
            } => {
                let form = PatientForm {
                    name,
                    age,
                    gender,
                    blood_group,
                    hospital_id: hospital,
                    contact,
                    condition,
                };
                let result = session.lifecycle().add_patient(&form).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Patient added successfully!".to_string(),
                    "Error adding patient",
                ));
            }
            PatientsCommand::Edit {
                id,
                name,
                age,
                gender,
                blood_group,
                hospital,
                contact,
                condition,
            } => {
                // The optimistic patch needs the row in the cache.
                if !session.load(&[Resource::Patients]).await {
                    return Ok(());
                }
                let edit = PatientEdit {
                    name,
                    age,
                    gender,
                    blood_group,
                    hospital_id: hospital,
                    contact,
                    condition,
                };
                let result = session.lifecycle().edit_patient(id, &edit).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Patient updated successfully!".to_string(),
                    "Error updating patient",
                ));
            }
        }
        Ok(())
    }

    async fn list(session: &mut Session, output: OutputFormat) -> anyhow::Result<()> {
        if !session.load(&[Resource::Patients]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let patients = cache.patients().list();

        match output {
            OutputFormat::Json => print_json(&patients)?,
            OutputFormat::Table if patients.is_empty() => {
                println!("No patients registered. Add one with 'bbreq patients add'.");
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = patients
                    .iter()
                    .map(|patient| {
                        vec![
                            patient.id.to_string(),
                            patient.name.clone(),
                            patient.age.to_string(),
                            patient.gender.clone(),
                            patient.blood_group.clone(),
                            cell(patient.hospital_name.as_deref()),
                            patient.contact.clone(),
                            cell(patient.condition.as_deref()),
                        ]
                    })
                    .collect();
                terminal::print_table(
                    &[
                        "ID",
                        "Name",
                        "Age",
                        "Gender",
                        "Group",
                        "Hospital",
                        "Contact",
                        "Condition",
                    ],
                    &rows,
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Hospitals {
    #[command(subcommand)]
    command: HospitalsCommand,
}

#[derive(Debug, Parser)]
enum HospitalsCommand {
    /// List hospitals
    List {
        /// Output format (default: table)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Register a hospital
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        location: String,

        /// Ten digit phone number
        #[arg(long)]
        contact: String,

        #[arg(long)]
        email: Option<String>,
    },
}

impl Hospitals {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        match self.command {
            HospitalsCommand::List { output } => Self::list(session, output).await?,
            HospitalsCommand::Add {
                name,
                location,
                contact,
                email,
            } => {
                let form = HospitalForm {
                    name,
                    location,
                    contact,
                    email,
                };
                let result = session.lifecycle().add_hospital(&form).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Hospital added successfully!".to_string(),
                    "Error adding hospital",
                ));
            }
        }
        Ok(())
    }

    async fn list(session: &mut Session, output: OutputFormat) -> anyhow::Result<()> {
        if !session.load(&[Resource::Hospitals]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let hospitals = cache.hospitals().list();

        match output {
            OutputFormat::Json => print_json(&hospitals)?,
            OutputFormat::Table if hospitals.is_empty() => {
                println!("No hospitals registered. Add one with 'bbreq hospitals add'.");
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = hospitals
                    .iter()
                    .map(|hospital| {
                        vec![
                            hospital.id.to_string(),
                            hospital.name.clone(),
                            hospital.location.clone(),
                            hospital.contact.clone(),
                            cell(hospital.email.as_deref()),
                        ]
                    })
                    .collect();
                terminal::print_table(&["ID", "Name", "Location", "Contact", "Email"], &rows);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Banks {
    #[command(subcommand)]
    command: BanksCommand,
}

#[derive(Debug, Parser)]
enum BanksCommand {
    /// List blood banks
    List {
        /// Output format (default: table)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Register a blood bank
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        location: String,

        /// Ten digit phone number
        #[arg(long)]
        contact: String,

        /// Storage capacity in units (at least 100)
        #[arg(long, default_value_t = DEFAULT_BANK_CAPACITY)]
        capacity: i64,
    },
}

impl Banks {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        match self.command {
            BanksCommand::List { output } => Self::list(session, output).await?,
            BanksCommand::Add {
                name,
                location,
                contact,
                capacity,
            } => {
                let form = BloodBankForm {
                    name,
                    location,
                    contact,
                    capacity,
                };
                let result = session.lifecycle().add_blood_bank(&form).await;
                session.notify(Notice::from_result(
                    &result,
                    |_| "Blood bank added successfully!".to_string(),
                    "Error adding blood bank",
                ));
            }
        }
        Ok(())
    }

    async fn list(session: &mut Session, output: OutputFormat) -> anyhow::Result<()> {
        if !session.load(&[Resource::BloodBanks]).await {
            return Ok(());
        }
        let cache = session.lifecycle().repository().cache().await;
        let banks = cache.blood_banks().list();

        match output {
            OutputFormat::Json => print_json(&banks)?,
            OutputFormat::Table if banks.is_empty() => {
                println!("No blood banks registered. Add one with 'bbreq banks add'.");
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = banks
                    .iter()
                    .map(|bank| {
                        vec![
                            bank.id.to_string(),
                            bank.name.clone(),
                            bank.location.clone(),
                            bank.contact.clone(),
                            cell(bank.capacity),
                        ]
                    })
                    .collect();
                terminal::print_table(&["ID", "Name", "Location", "Contact", "Capacity"], &rows);
            }
        }
        Ok(())
    }
}
