use chrono::{Duration, Utc};
use std::fs;
use std::io::{self, Write};
use workout_schedule::{
    Program, ProgramRecord, ScheduleSummary, SchedulingPreferences, ServiceConfig, SessionPolicy,
    assign_missing_uids, load_record_from_csv, load_record_from_json, logging,
    save_record_to_csv, save_record_to_json, schedule_program, shift_program_schedule,
    time::{format_local_datetime, parse_local_datetime, parse_start_date},
    update_session_duration, update_session_start, validate_program,
};

const HEADERS: [&str; 6] = ["week", "session", "uid", "goal", "start_at", "duration"];

fn render_sessions_as_text_table(program: &Program) -> String {
    let rows: Vec<[String; 6]> = program
        .chronological_positions()
        .into_iter()
        .map(|(w, s)| {
            let week = &program.weeks[w];
            let session = &week.sessions[s];
            [
                week.week.to_string(),
                session.session.to_string(),
                session.uid.clone(),
                session.goal.clone(),
                session
                    .start_at
                    .map(format_local_datetime)
                    .unwrap_or_default(),
                session
                    .duration_minutes
                    .map(|m| m.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&HEADERS[..]));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show sessions\n  summary                            Show schedule summary\n  prefs                              Show stored scheduling preferences\n  import <path>                      Load a bare program JSON (uids are assigned)\n  load <json|csv> <path>             Load a program record\n  save <json|csv> <path>             Persist the program record\n  schedule [YYYY-MM-DD] [days] [HH:MM] [minutes]\n                                     Regenerate the full schedule (days like mon,wed,fri or 1,3,5)\n  shift <days> [minutes]             Shift every scheduled session\n  move <uid> <YYYY-MM-DDTHH:MM>      Move one session\n  nudge <uid> <minutes>              Move one session relative to its current start\n  resize <uid> <minutes>             Change one session's duration\n  quit|exit                          Exit"
    );
}

fn print_preferences(record: &ProgramRecord) {
    let Some(prefs) = &record.scheduling_preferences else {
        println!("No scheduling preferences stored.");
        return;
    };
    let days = prefs
        .preferred_days
        .as_ref()
        .map(|d| d.join(", "))
        .unwrap_or_default();
    println!(
        "Start date      : {}",
        record
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_default()
    );
    println!("Days            : {}", days);
    println!(
        "Default time    : {}",
        prefs.default_time.clone().unwrap_or_default()
    );
    println!(
        "Default duration: {}",
        prefs
            .default_duration_minutes
            .map(|m| m.to_string())
            .unwrap_or_default()
    );
}

fn parse_days(raw: &str) -> SchedulingPreferences {
    let parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let numeric: Option<Vec<i64>> = parts.iter().map(|p| p.parse::<i64>().ok()).collect();
    match numeric {
        Some(indices) => SchedulingPreferences::from_days_of_week(indices),
        None => SchedulingPreferences::from_day_names(parts),
    }
}

fn import_program(path: &str) -> Result<ProgramRecord, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let program: Program = serde_json::from_str(&text)?;
    let program = assign_missing_uids(&program);
    validate_program(&program)?;
    Ok(ProgramRecord::new(program))
}

fn run_schedule<'a>(record: &mut ProgramRecord, mut args: impl Iterator<Item = &'a str>) {
    let date_arg = args.next().map(str::to_string);
    let start_date = match date_arg.or_else(|| record.start_date.map(|d| d.to_string())) {
        Some(date) => date,
        None => {
            println!("Usage: schedule <YYYY-MM-DD> [days] [HH:MM] [minutes]");
            return;
        }
    };
    let anchor = match parse_start_date(&start_date) {
        Ok(date) => date,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    let mut prefs = match args.next() {
        Some(days) => parse_days(days),
        None => record.scheduling_preferences.clone().unwrap_or_default(),
    };
    if let Some(time) = args.next() {
        prefs.default_time = Some(time.to_string());
    }
    if let Some(minutes) = args.next() {
        match minutes.parse::<u32>() {
            Ok(m) => prefs.default_duration_minutes = Some(m),
            Err(_) => {
                println!("Invalid minutes");
                return;
            }
        }
    }

    match schedule_program(&record.program, &start_date, Some(&prefs)) {
        Ok(outcome) => {
            println!("Scheduled: {}", outcome.summary.to_cli_summary());
            record.apply_schedule(outcome, anchor, Utc::now());
            println!("{}", render_sessions_as_text_table(&record.program));
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn main() {
    if let Err(err) = logging::init_logging("warn") {
        eprintln!("logging disabled: {err}");
    }
    let policy = match ServiceConfig::from_env() {
        Ok(config) => config.policy,
        Err(err) => {
            eprintln!("{err}; using default session policy");
            SessionPolicy::default()
        }
    };

    let mut record = ProgramRecord::default();

    println!("Workout Schedule (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or_default();
        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_sessions_as_text_table(&record.program)),
            "summary" => println!(
                "{}",
                ScheduleSummary::for_program(&record.program).to_cli_summary()
            ),
            "prefs" => print_preferences(&record),
            "import" => match parts.next() {
                Some(path) => match import_program(path) {
                    Ok(imported) => {
                        record = imported;
                        println!("Program imported from {}", path);
                        println!("{}", render_sessions_as_text_table(&record.program));
                    }
                    Err(e) => println!("Error importing program: {}", e),
                },
                None => println!("Usage: import <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some(kind), Some(path)) => {
                    let loaded = match kind {
                        "json" => load_record_from_json(path),
                        "csv" => load_record_from_csv(path),
                        _ => {
                            println!("Unknown format '{}'. Use json or csv.", kind);
                            continue;
                        }
                    };
                    match loaded {
                        Ok(loaded) => {
                            record = loaded;
                            println!("Program loaded from {}", path);
                            println!("{}", render_sessions_as_text_table(&record.program));
                        }
                        Err(e) => println!("Error loading program: {}", e),
                    }
                }
                _ => println!("Usage: load <json|csv> <path>"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some(kind), Some(path)) => {
                    let saved = match kind {
                        "json" => save_record_to_json(&record, path),
                        "csv" => save_record_to_csv(&record, path),
                        _ => {
                            println!("Unknown format '{}'. Use json or csv.", kind);
                            continue;
                        }
                    };
                    match saved {
                        Ok(()) => println!("Program saved to {}", path),
                        Err(e) => println!("Error saving program: {}", e),
                    }
                }
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "schedule" => run_schedule(&mut record, parts),
            "shift" => {
                let days = match parts.next().map(str::parse::<i64>) {
                    Some(Ok(v)) => v,
                    _ => {
                        println!("Usage: shift <days> [minutes]");
                        continue;
                    }
                };
                let minutes = match parts.next().map(str::parse::<i64>) {
                    None => 0,
                    Some(Ok(v)) => v,
                    Some(Err(_)) => {
                        println!("Invalid minutes");
                        continue;
                    }
                };
                match shift_program_schedule(&record.program, days, minutes) {
                    Ok(outcome) => {
                        record.replace_program(outcome.updated);
                        println!("Shifted {} sessions.", outcome.shifted_count);
                        println!("{}", render_sessions_as_text_table(&record.program));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "move" | "nudge" => {
                let (uid, value) = match (parts.next(), parts.next()) {
                    (Some(uid), Some(value)) => (uid, value),
                    _ => {
                        println!("Usage: move <uid> <YYYY-MM-DDTHH:MM> | nudge <uid> <minutes>");
                        continue;
                    }
                };
                let Some(session) = record.program.find_session(uid) else {
                    println!("Session {} not found.", uid);
                    continue;
                };
                let new_start = if cmd == "move" {
                    parse_local_datetime(value)
                } else {
                    let current = session.start_at;
                    let delta = value.parse::<i64>().ok().and_then(Duration::try_minutes);
                    current
                        .zip(delta)
                        .and_then(|(start, delta)| start.checked_add_signed(delta))
                };
                let Some(new_start) = new_start else {
                    println!("Invalid start for session {}", uid);
                    continue;
                };
                let update = update_session_start(&record.program, uid, new_start);
                if !update.found() {
                    println!("Session {} not found.", uid);
                    continue;
                }
                record.replace_program(update.updated);
                println!("Session {} starts at {}.", uid, format_local_datetime(new_start));
            }
            "resize" => {
                let (uid, minutes) = match (parts.next(), parts.next().map(str::parse::<u32>)) {
                    (Some(uid), Some(Ok(minutes))) => (uid, minutes),
                    _ => {
                        println!("Usage: resize <uid> <minutes>");
                        continue;
                    }
                };
                if let Err(e) = policy.validate_duration(minutes) {
                    println!("Error: {}", e);
                    continue;
                }
                let update = update_session_duration(&record.program, uid, minutes);
                if !update.found() {
                    println!("Session {} not found.", uid);
                    continue;
                }
                record.replace_program(update.updated);
                println!("Session {} lasts {} minutes.", uid, minutes);
            }
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }
}
