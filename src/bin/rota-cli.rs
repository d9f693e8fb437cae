#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rotaguard::{
    audit_staff, config, detect_pattern, io, to_code, to_logical, BackfillQuery, ComplianceRules,
    DateRange, RestRules, RosterEngine, ShiftCode, ShiftWindow, StaffId, VacantSlot,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de planning et de contrôle du temps de travail
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer un planning à partir d'un pattern
    Generate {
        /// Configuration du pattern (JSON)
        #[arg(long)]
        config: String,
        /// Personnel (CSV)
        #[arg(long)]
        staff: String,
        /// Premier jour (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Dernier jour inclus (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Affectations antérieures (CSV), pour le repos au démarrage
        #[arg(long)]
        prior: Option<String>,
        #[arg(long, default_value_t = 11)]
        min_rest_hours: u32,
        /// Identifiant de version apposé sur les affectations
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        shortfalls_csv: Option<String>,
    },

    /// Contrôler un planning (repos, moyenne 17 semaines, nuit, jeunes)
    Check {
        #[arg(long)]
        assignments: String,
        #[arg(long)]
        staff: String,
        /// Date de référence du contrôle (YYYY-MM-DD)
        #[arg(long)]
        reference: NaiveDate,
        #[arg(long, default_value_t = 11)]
        min_rest_hours: u32,
        #[arg(long, default_value_t = 17)]
        window_weeks: u32,
        /// Export CSV des infractions (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Trouver un remplaçant pour un créneau vacant
    Backfill {
        #[arg(long)]
        assignments: String,
        #[arg(long)]
        staff: String,
        #[arg(long)]
        date: NaiveDate,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM (avant `start` = lendemain)
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "E")]
        code: String,
        /// liste "id1,id2,..." à écarter
        #[arg(long)]
        exclude: Option<String>,
        #[arg(long, default_value_t = 11)]
        min_rest_hours: u32,
    },

    /// Détecter le cycle d'une séquence de codes
    Detect {
        /// liste "E,L,R,..."
        #[arg(long)]
        codes: String,
    },

    /// Normaliser un libellé de shift
    Code { text: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }
    #[cfg(not(feature = "logging"))]
    let _ = cli.log;

    let code = match cli.cmd {
        Commands::Generate {
            config: config_path,
            staff,
            from,
            to,
            prior,
            min_rest_hours,
            version,
            out_json,
            out_csv,
            shortfalls_csv,
        } => {
            let pattern = config::load_config_from_file(&config_path)?;
            let staff = io::import_staff_csv(&staff)?;
            let prior = match prior {
                Some(path) => io::import_assignments_csv(path)?,
                None => Vec::new(),
            };
            let range = DateRange::new(from, to).map_err(anyhow::Error::msg)?;
            let mut engine = RosterEngine::new(RestRules { min_rest_hours });
            if let Some(v) = version {
                engine = engine.with_version(v);
            }

            let generation = engine.generate(&pattern, &staff, range, &prior)?;
            if let Some(path) = out_json {
                io::write_json_atomic(path, &generation)?;
            }
            if let Some(path) = out_csv {
                io::write_atomic(path, |tmp| {
                    io::write_assignments_csv(tmp, &generation.assignments)
                })?;
            }
            if let Some(path) = shortfalls_csv {
                io::write_atomic(path, |tmp| {
                    io::write_shortfalls_csv(tmp, &generation.shortfalls)
                })?;
            }

            for a in &generation.assignments {
                println!(
                    "{} | {} | {} → {} | {}{}",
                    a.date,
                    a.staff_id,
                    a.start.to_rfc3339(),
                    a.end.to_rfc3339(),
                    a.shift_code,
                    if a.is_forced { " (forced)" } else { "" }
                );
            }
            if generation.shortfalls.is_empty() {
                println!("OK: {} assignment(s), full coverage", generation.assignments.len());
                0
            } else {
                eprintln!(
                    "{} assignment(s), {} shortfall(s)",
                    generation.assignments.len(),
                    generation.shortfalls.len()
                );
                for s in &generation.shortfalls {
                    eprintln!("{} | {} | {}", s.date, s.target_shift_code, s.reason);
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Check {
            assignments,
            staff,
            reference,
            min_rest_hours,
            window_weeks,
            report,
        } => {
            let assignments = io::import_assignments_csv(&assignments)?;
            let staff = io::import_staff_csv(&staff)?;
            let rules = ComplianceRules {
                min_rest_hours,
                window_weeks,
                ..ComplianceRules::default()
            };

            let mut violations = Vec::new();
            for member in &staff {
                let audit = audit_staff(member, &assignments, reference, &rules);
                if audit.night_work.is_night_worker {
                    println!(
                        "{}: night worker ({:.1}h in night window)",
                        member.id, audit.night_work.total_night_hours
                    );
                }
                violations.extend(audit.violations);
            }

            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                for v in &violations {
                    eprintln!("{} | {} | {} | {}", v.kind, v.staff_id, v.date, v.message);
                }
                if let Some(path) = report {
                    io::write_atomic(&path, |tmp| io::write_violations_csv(tmp, &violations))
                        .with_context(|| format!("writing report {path}"))?;
                }
                2
            }
        }
        Commands::Backfill {
            assignments,
            staff,
            date,
            start,
            end,
            code,
            exclude,
            min_rest_hours,
        } => {
            let assignments = io::import_assignments_csv(&assignments)?;
            let staff = io::import_staff_csv(&staff)?;
            let exclude: Vec<StaffId> = exclude
                .as_deref()
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(StaffId::new)
                .collect();
            let slot = VacantSlot::new(date, ShiftWindow::parse(&start, &end)?, to_code(&code))?;
            let engine = RosterEngine::new(RestRules { min_rest_hours });
            let query = BackfillQuery::new(&slot, &staff, &assignments).excluding(&exclude);

            match engine.find_best_candidate(&query) {
                Some(member) => {
                    println!("{}", member.id);
                    0
                }
                None => {
                    eprintln!("no eligible candidate");
                    2
                }
            }
        }
        Commands::Detect { codes } => {
            let codes: Vec<ShiftCode> = codes
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(to_code)
                .collect();
            let detected = detect_pattern(&codes).context("empty code sequence")?;
            let pattern: Vec<&str> = detected.pattern.iter().map(ShiftCode::as_str).collect();
            println!(
                "cycle={} pattern={} confidence={:.3}",
                detected.cycle_length,
                pattern.join(","),
                detected.confidence
            );
            0
        }
        Commands::Code { text } => {
            let code = to_code(&text);
            println!("{} {}", code, to_logical(&code));
            0
        }
    };

    std::process::exit(code);
}
