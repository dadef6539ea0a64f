use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::Write;

use rotation_core::{GenerationReport, Half, PatternResult, PlacedRace, Strategy};

const fn half_label(half: Half) -> &'static str {
    match half {
        Half::Front => "early",
        Half::Back => "late",
    }
}

fn race_label(race: &PlacedRace) -> String {
    format!(
        "{} {:02} {} (G{}, {} {})",
        half_label(race.half),
        race.month,
        race.name,
        race.grade,
        race.surface,
        race.distance
    )
}

pub fn describe_strategy(strategy: Option<&Strategy>) -> String {
    match strategy {
        Some(strategy) if !strategy.is_empty() => strategy
            .iter()
            .map(|(category, steps)| format!("{category} +{steps}"))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "natural aptitude".to_string(),
    }
}

fn describe_condition(pattern: &PatternResult) -> String {
    let surface = pattern
        .main_condition
        .surface
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let distance = pattern
        .main_condition
        .distance
        .map_or_else(|| "-".to_string(), |d| d.to_string());
    format!("{surface} / {distance}")
}

fn pattern_title(index: usize, pattern: &PatternResult) -> String {
    let final_name = pattern
        .final_race
        .as_ref()
        .map_or("no final", |race| race.name.as_str());
    format!("Pattern {} [{}] {final_name}", index + 1, pattern.scenario)
}

fn stages(pattern: &PatternResult) -> [(&'static str, &[PlacedRace]); 3] {
    [
        ("Junior", pattern.junior.as_slice()),
        ("Classic", pattern.classic.as_slice()),
        ("Senior", pattern.senior.as_slice()),
    ]
}

pub fn generate_console_report(
    out: &mut dyn Write,
    character_name: &str,
    report: &GenerationReport,
) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!(
            "📋 Rotation patterns for {character_name} (#{})",
            report.character_id
        )
        .bright_cyan()
        .bold()
    )?;
    writeln!(out, "{}", "==============================".cyan())?;
    writeln!(out, "Patterns: {}", report.patterns.len())?;
    writeln!(out, "Completed races: {}", report.completed.len())?;
    writeln!(out)?;

    if report.patterns.is_empty() {
        writeln!(out, "{}", "No outstanding races to plan.".green())?;
    }

    for (index, pattern) in report.patterns.iter().enumerate() {
        writeln!(out, "{}", pattern_title(index, pattern).bold())?;
        writeln!(
            out,
            "   Strategy: {}",
            describe_strategy(pattern.strategy.as_ref())
        )?;
        writeln!(out, "   Main condition: {}", describe_condition(pattern))?;
        for (label, races) in stages(pattern) {
            if races.is_empty() {
                continue;
            }
            writeln!(out, "   {label}:")?;
            for race in races {
                writeln!(out, "     • {}", race_label(race))?;
            }
        }
        let composition = &pattern.composition;
        writeln!(
            out,
            "   Inheritance: {} stars across {} lineage slots",
            composition.total_stars, composition.lineage_slots
        )?;
        writeln!(out, "   Total races: {}", pattern.total_races)?;
        writeln!(out)?;
    }

    if !report.unplaced.is_empty() {
        let ids = report
            .unplaced
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "{} {}", "⚠️  Unplaced races:".yellow(), ids.yellow())?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &GenerationReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    character_name: &str,
    report: &GenerationReport,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writeln!(out, "# Rotation Patterns: {character_name}\n")?;
    writeln!(
        out,
        "_Generated {}_\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Character**: {}", report.character_id)?;
    writeln!(out, "- **Patterns**: {}", report.patterns.len())?;
    writeln!(out, "- **Completed races**: {}", report.completed.len())?;
    writeln!(out, "- **Unplaced races**: {}\n", report.unplaced.len())?;

    if report.patterns.is_empty() {
        writeln!(out, "_No outstanding races._")?;
        return Ok(());
    }

    for (index, pattern) in report.patterns.iter().enumerate() {
        writeln!(out, "## {}\n", pattern_title(index, pattern))?;
        writeln!(
            out,
            "- **Strategy**: {}",
            describe_strategy(pattern.strategy.as_ref())
        )?;
        writeln!(out, "- **Main condition**: {}", describe_condition(pattern))?;
        writeln!(
            out,
            "- **Inheritance**: {} stars, {} lineage slots\n",
            pattern.composition.total_stars, pattern.composition.lineage_slots
        )?;
        writeln!(out, "| Stage | Slot | Race | Grade | Surface | Distance |")?;
        writeln!(out, "|---|---|---|---|---|---|")?;
        for (label, races) in stages(pattern) {
            for race in races {
                writeln!(
                    out,
                    "| {label} | {} {:02} | {} | G{} | {} | {} |",
                    half_label(race.half),
                    race.month,
                    race.name,
                    race.grade,
                    race.surface,
                    race.distance
                )?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
