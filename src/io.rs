//! Adaptateurs fichiers (CSV/JSON) autour du cœur.
//!
//! Les en-têtes historiques (`staffId`, `staff_id`, `Staff ID`...) sont
//! normalisés ici, une seule fois ; le moteur ne voit que des types canoniques.

use crate::codes::to_code;
use crate::compliance::ComplianceViolation;
use crate::model::{AssignmentId, ShiftAssignment, Shortfall, StaffId, StaffMember};
use crate::time::{parse_date, ShiftInterval, TimeOfDay};
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

fn normalize_header(h: &str) -> String {
    h.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Position d'une colonne d'après ses alias (déjà normalisés).
fn column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&normalize_header(h).as_str()))
}

fn field<'r>(rec: &'r StringRecord, idx: Option<usize>) -> Option<&'r str> {
    idx.and_then(|i| rec.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

/// Import du personnel : header `id,name[,date_of_birth][,opt_out_48h]`.
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<StaffMember>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_staff_csv(file)
}

pub fn read_staff_csv<R: Read>(reader: R) -> anyhow::Result<Vec<StaffMember>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let id_col =
        column(&headers, &["id", "staffid", "staff", "employeeid"]).context("missing id column")?;
    let name_col = column(&headers, &["name", "displayname", "fullname"]);
    let dob_col = column(&headers, &["dateofbirth", "dob", "birthdate"]);
    let opt_col = column(&headers, &["optout48h", "optout48hflag", "optout"]);

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = field(&rec, Some(id_col)).context("invalid staff row (empty id)")?;
        let mut member = StaffMember::new(id, field(&rec, name_col).unwrap_or(id));
        if let Some(dob) = field(&rec, dob_col) {
            member.date_of_birth =
                Some(parse_date(dob).with_context(|| format!("invalid date_of_birth for {id}"))?);
        }
        if let Some(flag) = field(&rec, opt_col) {
            member.opt_out_48h =
                parse_bool(flag).with_context(|| format!("invalid opt_out_48h value for {id}"))?;
        }
        out.push(member);
    }
    Ok(out)
}

/// Import d'affectations. Colonnes requises : staff_id, date, start, end,
/// shift_code. `start`/`end` en RFC3339, ou en `HH:MM` relatif à `date`
/// (règle du passage de minuit).
pub fn import_assignments_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftAssignment>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_assignments_csv(file)
}

pub fn read_assignments_csv<R: Read>(reader: R) -> anyhow::Result<Vec<ShiftAssignment>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let id_col = column(&headers, &["id", "assignmentid", "shiftid"]);
    let staff_col = column(&headers, &["staffid", "staff", "employeeid"])
        .context("missing staff_id column")?;
    let date_col = column(&headers, &["date", "shiftdate"]).context("missing date column")?;
    let start_col = column(&headers, &["start", "starttime"]).context("missing start column")?;
    let end_col = column(&headers, &["end", "endtime"]).context("missing end column")?;
    let code_col = column(&headers, &["shiftcode", "code", "shift", "shifttype"])
        .context("missing shift_code column")?;
    let forced_col = column(&headers, &["isforced", "forced"]);
    let reason_col = column(&headers, &["forcedreason", "reason"]);
    let version_col = column(&headers, &["versionid", "version"]);

    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let row = line + 2;
        let required = |col: usize, name: &str| {
            field(&rec, Some(col)).with_context(|| format!("row {row}: missing {name}"))
        };
        let staff = required(staff_col, "staff_id")?;
        let date = parse_date(required(date_col, "date")?)
            .with_context(|| format!("row {row}: invalid date"))?;
        let start = required(start_col, "start")?;
        let end = required(end_col, "end")?;
        let interval = parse_bounds(date, start, end)
            .with_context(|| format!("row {row}: invalid start/end"))?;

        let mut assignment = ShiftAssignment::new(
            StaffId::new(staff),
            date,
            interval,
            to_code(field(&rec, Some(code_col)).unwrap_or("")),
        );
        if let Some(id) = field(&rec, id_col) {
            assignment.id = AssignmentId::new(id);
        }
        if let Some(flag) = field(&rec, forced_col) {
            assignment.is_forced =
                parse_bool(flag).with_context(|| format!("row {row}: invalid is_forced"))?;
        }
        assignment.forced_reason = field(&rec, reason_col).map(str::to_string);
        assignment.version_id = field(&rec, version_col).unwrap_or_default().to_string();
        out.push(assignment);
    }
    Ok(out)
}

fn parse_bounds(date: chrono::NaiveDate, start: &str, end: &str) -> anyhow::Result<ShiftInterval> {
    if let (Ok(s), Ok(e)) = (start.parse::<DateTime<Utc>>(), end.parse::<DateTime<Utc>>()) {
        if e <= s {
            bail!("end must be strictly after start");
        }
        return Ok(ShiftInterval { start: s, end: e });
    }
    let start: TimeOfDay = start.parse()?;
    let end: TimeOfDay = end.parse()?;
    Ok(ShiftInterval::on(date, start, end)?)
}

/// Export CSV des affectations:
/// header `id,staff_id,date,start,end,shift_code,is_forced,forced_reason,version_id`
pub fn write_assignments_csv<W: Write>(
    writer: W,
    assignments: &[ShiftAssignment],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record([
        "id",
        "staff_id",
        "date",
        "start",
        "end",
        "shift_code",
        "is_forced",
        "forced_reason",
        "version_id",
    ])?;
    for a in assignments {
        let date = a.date.to_string();
        let start = a.start.to_rfc3339();
        let end = a.end.to_rfc3339();
        w.write_record([
            a.id.as_str(),
            a.staff_id.as_str(),
            date.as_str(),
            start.as_str(),
            end.as_str(),
            a.shift_code.as_str(),
            if a.is_forced { "true" } else { "false" },
            a.forced_reason.as_deref().unwrap_or(""),
            a.version_id.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des manques: header `date,shift_code,reason`
pub fn write_shortfalls_csv<W: Write>(writer: W, shortfalls: &[Shortfall]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record(["date", "shift_code", "reason"])?;
    for s in shortfalls {
        let date = s.date.to_string();
        let reason = s.reason.to_string();
        w.write_record([date.as_str(), s.target_shift_code.as_str(), reason.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des infractions: header `kind,staff_id,date,gap_hours,hours,message`
pub fn write_violations_csv<W: Write>(
    writer: W,
    violations: &[ComplianceViolation],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record(["kind", "staff_id", "date", "gap_hours", "hours", "message"])?;
    let num = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();
    for v in violations {
        let date = v.date.to_string();
        let gap = num(v.gap_hours);
        let hours = num(v.hours);
        w.write_record([
            v.kind.as_str(),
            v.staff_id.as_str(),
            date.as_str(),
            gap.as_str(),
            hours.as_str(),
            v.message.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Crée le fichier `path` et y écrit via `write` de manière atomique.
pub fn write_atomic<P, F>(path: P, write: F) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut NamedTempFile) -> anyhow::Result<()>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    write(&mut tmp)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("atomic rename to {}", path.display()))?;
    Ok(())
}

/// Export JSON (jolie mise en forme), écrit de manière atomique.
pub fn write_json_atomic<P, T>(path: P, value: &T) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_vec_pretty(value)?;
    write_atomic(path, |tmp| Ok(tmp.write_all(&json)?))
}
