//! Line-oriented intake console.
//!
//! Usage: `cardio-console [config.toml]`

use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use cardio_frontend::forms::{
    parse_yes_no, AppointmentForm, AppointmentKind, Level, LifestyleForm, PersonalForm,
    PrescriptionForm, TestForm,
};
use cardio_frontend::wizard::{PatientOverview, PrescriptionContext, TableView};
use cardio_frontend::{
    load_ui_config, load_users, FrontendError, HomeChoice, HttpClinicApi, Page, Wizard,
};
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

struct Console {
    lines: io::Lines<StdinLock<'static>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: io::stdin().lines(),
        }
    }

    fn ask(&mut self, label: &str) -> anyhow::Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;
        match self.lines.next() {
            Some(line) => Ok(line?.trim().to_string()),
            None => bail!("input closed"),
        }
    }

    /// Ask until the answer parses.
    fn ask_parsed<T>(&mut self, label: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        loop {
            let answer = self.ask(label)?;
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(e) => println!("  {}", e),
            }
        }
    }

    fn ask_yes_no(&mut self, label: &str) -> anyhow::Result<bool> {
        loop {
            match parse_yes_no(&self.ask(label)?) {
                Ok(answer) => return Ok(answer),
                Err(e) => println!("  {}", e),
            }
        }
    }

    /// Blank means today.
    fn ask_date(&mut self, label: &str) -> anyhow::Result<NaiveDate> {
        loop {
            let answer = self.ask(&format!("{} (YYYY-MM-DD, blank for today)", label))?;
            if answer.is_empty() {
                return Ok(chrono::Local::now().date_naive());
            }
            match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
                Ok(date) => return Ok(date),
                Err(e) => println!("  {}", e),
            }
        }
    }
}

fn report<T>(result: Result<T, FrontendError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(FrontendError::Client(e)) => {
            match e.status() {
                Some(status) => println!("Error (HTTP {}): {}", status, e),
                None => println!("Error: {}", e),
            }
            None
        }
        Err(e) => {
            println!("Error: {}", e);
            None
        }
    }
}

fn print_context(context: &PrescriptionContext) {
    if let Some(patient) = &context.info.patient {
        println!(
            "Patient {}: {}, age {}, {:.0} cm, {:.1} kg",
            patient.patient_id, patient.name, patient.age, patient.height, patient.weight
        );
    }
    if let Some(lifestyle) = &context.info.lifestyle {
        println!(
            "Smokes: {}  Alcohol: {}  Active: {}",
            lifestyle.smokes(),
            lifestyle.drinks(),
            lifestyle.is_active()
        );
    }
    match &context.test_details {
        Some(test) => println!(
            "Blood pressure {}/{}  cholesterol {}  glucose {}",
            test.ap_hi, test.ap_lo, test.cholesterol, test.gluc
        ),
        None => println!("No test results for this appointment"),
    }
    println!("{} rows in the clinic-wide analysis", context.analysis.len());
}

fn print_overview(overview: &PatientOverview) {
    let Some(patient) = &overview.info.patient else {
        println!("No patient found");
        return;
    };
    let gender = if patient.is_male() { "male" } else { "female" };
    println!(
        "{} ({}, age {}, id {})",
        patient.name, gender, patient.age, patient.patient_id
    );
    if overview.appointments.is_empty() {
        println!("No appointments");
    }
    for history in &overview.appointments {
        let appt = &history.appointment;
        println!(
            "- {} on {} with doctor {} (appointment {})",
            appt.appointment_type, appt.appointment_date, appt.doctor_id, appt.appointment_id
        );
        match &history.records {
            Ok(records) => {
                if let Some(test) = &records.test_details {
                    println!("    test: {}/{} chol {} gluc {}", test.ap_hi, test.ap_lo, test.cholesterol, test.gluc);
                }
                if let Some(presc) = &records.prescription {
                    println!(
                        "    prescription: {} {} for {} days",
                        presc.medicine_name, presc.dosage, presc.duration_days
                    );
                }
            }
            Err(e) => println!("    records unavailable: {}", e),
        }
    }
}

fn print_tables(views: &[TableView]) {
    for view in views {
        println!("-- {} --", view.table.label());
        match &view.rows {
            Ok(rows) if rows.is_empty() => println!("(empty)"),
            Ok(rows) => {
                for row in rows {
                    println!("{}", serde_json::Value::Object(row.clone()));
                }
            }
            Err(e) => println!("Failed to load: {}", e),
        }
    }
}

async fn run(wizard: &mut Wizard<HttpClinicApi>, console: &mut Console) -> anyhow::Result<()> {
    loop {
        println!("\n== {} ==", wizard.page());
        match wizard.page() {
            Page::Login => {
                let username = console.ask("Username (blank to quit)")?;
                if username.is_empty() {
                    return Ok(());
                }
                let password = console.ask("Password")?;
                report(wizard.login(&username, &password));
            }
            Page::Home => {
                println!("1) New patient  2) Existing patient  3) Analyze  4) Logout");
                match console.ask("Choice")?.as_str() {
                    "1" => {
                        report(wizard.choose(HomeChoice::NewPatient));
                    }
                    "2" => {
                        report(wizard.choose(HomeChoice::ExistingPatient));
                    }
                    "3" => {
                        report(wizard.open_analysis());
                    }
                    "4" => wizard.logout(),
                    other => println!("Unknown choice '{}'", other),
                }
            }
            Page::NewPatientPersonal => {
                let form = PersonalForm {
                    name: console.ask("Full name")?,
                    age: console.ask_parsed("Age")?,
                    gender: console.ask_parsed("Gender (Male/Female)")?,
                    height: console.ask_parsed("Height (cm)")?,
                    weight: console.ask_parsed("Weight (kg)")?,
                };
                if let Some(id) = report(wizard.submit_personal(&form).await) {
                    println!("Patient created with ID: {}", id);
                }
            }
            Page::NewPatientLifestyle => {
                let form = LifestyleForm {
                    smoke: console.ask_yes_no("Do you smoke? (yes/no)")?,
                    alco: console.ask_yes_no("Do you consume alcohol? (yes/no)")?,
                    active: console.ask_yes_no("Are you physically active? (yes/no)")?,
                };
                report(wizard.submit_lifestyle(form).await);
            }
            Page::NewPatientAppointment => {
                for (i, kind) in AppointmentKind::ALL.iter().enumerate() {
                    println!("{}) {}", i + 1, kind);
                }
                let form = AppointmentForm {
                    kind: console.ask_parsed("Appointment type")?,
                    date: console.ask_date("Appointment date")?,
                };
                if let Some(booking) = report(wizard.submit_appointment(form).await) {
                    println!(
                        "Appointment {} booked with doctor {}",
                        booking.appointment_id, booking.assigned_doctor_id
                    );
                }
            }
            Page::NewPatientTest => {
                let levels: Vec<_> = Level::ALL.iter().map(|l| l.label()).collect();
                println!("Levels: {}", levels.join(", "));
                let form = TestForm {
                    ap_hi: console.ask_parsed("Systolic blood pressure")?,
                    ap_lo: console.ask_parsed("Diastolic blood pressure")?,
                    cholesterol: console.ask_parsed("Cholesterol level")?,
                    glucose: console.ask_parsed("Glucose level")?,
                };
                if let Some(id) = report(wizard.submit_test(form).await) {
                    println!("Test saved with ID: {}", id);
                }
            }
            Page::NewPatientPrescription => {
                if let Some(context) = report(wizard.prescription_context().await) {
                    print_context(&context);
                }
                println!("1) Prescribe  2) Back to home");
                match console.ask("Choice")?.as_str() {
                    "1" => {
                        let form = PrescriptionForm {
                            medicine_name: console.ask("Medicine")?,
                            dosage: console.ask("Dosage")?,
                            duration_days: console.ask_parsed("Duration (days)")?,
                            prescribed_date: console.ask_date("Prescribed date")?,
                        };
                        if let Some(id) = report(wizard.submit_prescription(&form).await) {
                            println!("Prescription saved with ID: {}", id);
                        }
                    }
                    _ => {
                        report(wizard.go_home());
                    }
                }
            }
            Page::ExistingPatient => {
                let answer = console.ask("Patient ID (blank for home)")?;
                if answer.is_empty() {
                    report(wizard.go_home());
                    continue;
                }
                match answer.parse::<i64>() {
                    Ok(patient_id) => {
                        if let Some(overview) = report(wizard.lookup_patient(patient_id).await) {
                            print_overview(&overview);
                        }
                    }
                    Err(e) => println!("  {}", e),
                }
            }
            Page::Analyze => {
                if let Some(views) = report(wizard.browse_tables().await) {
                    print_tables(&views);
                }
                console.ask("Press enter to return home")?;
                report(wizard.go_home());
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_ui_config(config_path.as_deref())
        .context("Failed to load front-end configuration")?;
    let users = load_users(&config.users_path)?;
    let api = HttpClinicApi::new(&config.base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;

    let mut wizard = Wizard::new(api, users);
    run(&mut wizard, &mut Console::new()).await
}
