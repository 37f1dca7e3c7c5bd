use crate::models::{DayResponse, HourSlot};

pub fn render_index(day: &DayResponse) -> String {
    let grid: String = day.hours.iter().map(render_hour).collect();
    let progress = format!(
        "Today's Progress: {} of {} available hours",
        day.progress.completed_count, day.progress.available_count
    );

    INDEX_HTML
        .replace("{{DATE}}", &day.date.date().format("%A, %B %-d, %Y").to_string())
        .replace("{{GRID}}", &grid)
        .replace("{{PROGRESS}}", &progress)
        .replace("{{PERCENT}}", &day.progress.percent.to_string())
}

fn render_hour(slot: &HourSlot) -> String {
    let status = slot.status;
    let (class, mark) = if status.completed {
        ("hour completed", "✓")
    } else if status.missed {
        ("hour missed", "✗")
    } else if status.is_current {
        ("hour current", "⏳")
    } else {
        ("hour future", "")
    };
    let disabled = if status.is_future { " disabled" } else { "" };

    format!(
        r#"<form method="post" action="/toggle/{key}"><button class="{class}" type="submit"{disabled}><span>{label}</span><span class="mark">{mark}</span></button></form>"#,
        key = slot.hour,
        label = slot.label,
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta http-equiv="refresh" content="60" />
  <title>Squat Tracker</title>
  <style>
    :root {
      --bg: #f8f3e6;
      --ink: #2b2a28;
      --done: #2d7a4b;
      --missed: #c63b2b;
      --current: #ff6b4a;
      --future: #b9b3aa;
      --card: rgba(255, 255, 255, 0.9);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px;
    }

    .app {
      width: min(640px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.4rem, 3vw, 2rem);
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 12px;
    }

    .hour {
      width: 100%;
      border: 2px solid transparent;
      border-radius: 16px;
      padding: 18px 12px;
      font-size: 1.1rem;
      font-weight: 600;
      display: flex;
      justify-content: space-between;
      cursor: pointer;
      background: white;
    }

    .hour.completed { border-color: var(--done); color: var(--done); }
    .hour.missed { border-color: var(--missed); color: var(--missed); }
    .hour.current { border-color: var(--current); color: var(--current); }
    .hour.future { color: var(--future); cursor: not-allowed; }

    .progress {
      margin: 0;
      font-size: 1rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>{{DATE}}</h1>
    <section class="grid">{{GRID}}</section>
    <p class="progress">{{PROGRESS}} ({{PERCENT}}%)</p>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyProgress, HourStatus};

    fn slot(hour: u32, status: HourStatus) -> HourSlot {
        let hour = crate::models::HourKey::new(hour).unwrap();
        HourSlot {
            hour,
            label: hour.label(),
            status,
        }
    }

    #[test]
    fn page_marks_each_state_and_locks_future_hours() {
        let base = HourStatus {
            completed: false,
            missed: false,
            is_current: false,
            is_future: false,
        };
        let day = DayResponse {
            date: "2024-06-01".parse().unwrap(),
            hours: vec![
                slot(10, HourStatus { completed: true, ..base }),
                slot(11, HourStatus { missed: true, ..base }),
                slot(12, HourStatus { is_current: true, ..base }),
                slot(13, HourStatus { is_future: true, ..base }),
            ],
            progress: DailyProgress {
                completed_count: 1,
                available_count: 3,
                percent: 33,
            },
        };

        let html = render_index(&day);
        assert!(html.contains("Saturday, June 1, 2024"));
        assert!(html.contains(r#"action="/toggle/10:00"><button class="hour completed""#));
        assert!(html.contains(r#"class="hour missed""#));
        assert!(html.contains(r#"class="hour current""#));
        assert!(html.contains(r#"class="hour future" type="submit" disabled"#));
        assert!(html.contains("Today's Progress: 1 of 3 available hours (33%)"));
    }
}
