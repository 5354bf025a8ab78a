//! Terminal rendering for timetable types.

use owo_colors::OwoColorize;
use timetable_core::commute::CommuteTime;
use timetable_core::note::{Note, NoteKind, NotePlan};
use timetable_core::sync::SyncReport;
use timetable_core::{Building, Parity, Settings};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Note {
    fn render(&self) -> String {
        let span = format!("{}–{}", self.start.format("%H:%M"), self.end.format("%H:%M"));
        match self.kind {
            NoteKind::Study => format!("   {} {}", self.title.green(), span),
            NoteKind::Outbound | NoteKind::Return => {
                format!("   {} {}", self.title.dimmed(), span.dimmed())
            }
        }
    }
}

impl Render for NotePlan {
    fn render(&self) -> String {
        let mut lines = Vec::new();
        let mut current = None;

        for note in &self.notes {
            if current != Some(note.date) {
                current = Some(note.date);
                lines.push(format!("{}", note.date.format("%a %Y-%m-%d").bold()));
            }
            lines.push(note.render());
        }

        if lines.is_empty() {
            lines.push("No classes in the next two weeks".dimmed().to_string());
        }

        lines.join("\n")
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        format!(
            "{}\n\n{} {} study days, {} commute notes ({} old notes removed)",
            self.plan.render(),
            "Synced:".green().bold(),
            self.study_days(),
            self.commute_notes(),
            self.deleted
        )
    }
}

impl Render for CommuteTime {
    fn render(&self) -> String {
        let show = |s: &str| {
            if s.trim().is_empty() {
                "—".dimmed().to_string()
            } else {
                s.to_string()
            }
        };
        format!("→ {}  ← {}", show(&self.forwards), show(&self.backwards))
    }
}

impl Render for Settings {
    fn render(&self) -> String {
        let commute = |b: Building| format!("commute.{:<3} {}", b.key(), self.commute.for_building(b).render());
        [
            format!("apiKey          {}", self.masked_api_key()),
            format!("generateCommute {}", self.generate_commute),
            format!("vault           {}", self.vault.display()),
            format!("path            {}", self.path),
            commute(Building::Op),
            commute(Building::A),
        ]
        .join("\n")
    }
}

/// Header line: which week of the cycle the API thinks it is.
pub fn render_week(anchor: chrono::NaiveDate, parity: Parity) -> String {
    let label = match parity {
        Parity::Odd => "odd",
        Parity::Even => "even",
    };
    format!(
        "{} {} ({} week)",
        "📅".bold(),
        anchor.format("%Y-%m-%d"),
        label
    )
}
