use crate::itinerary::view_models::*;

/// Markdown formatter for itinerary trees
///
/// Open/closed state has no meaning on paper, so every node is written out.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Format tree as markdown
    pub fn format(tree: &DisclosureTree) -> String {
        let mut md = String::with_capacity(2048);

        for day in &tree.days {
            match day.title.as_deref().filter(|t| !t.is_empty()) {
                Some(title) => md.push_str(&format!("## {} \u{2014} {}\n\n", day.date, title)),
                None => md.push_str(&format!("## {}\n\n", day.date)),
            }
            md.push_str(&format!(
                "*{} \u{b7} {} stops \u{b7} {}% done*\n\n",
                day.range_label(),
                day.progress.total,
                day.progress.percent
            ));

            for stop in &day.stops {
                Self::format_stop(&mut md, stop);
            }
        }

        md
    }

    fn format_stop(md: &mut String, stop: &StopNode) {
        let check = if stop.done { "x" } else { " " };
        match &stop.time {
            Some(time) => md.push_str(&format!(
                "### [{}] {} {} ({})\n\n",
                check,
                stop.position_label(),
                stop.name,
                time
            )),
            None => md.push_str(&format!(
                "### [{}] {} {}\n\n",
                check,
                stop.position_label(),
                stop.name
            )),
        }

        for block in &stop.body {
            match block {
                StopBlock::Description { text } => md.push_str(&format!("{}\n\n", text)),
                StopBlock::Section(section) => {
                    md.push_str(&format!("**{}**\n\n", section.title));
                    for item in &section.items {
                        md.push_str(&format!("- {}\n", item));
                    }
                    md.push('\n');
                }
                StopBlock::Map(map) => {
                    md.push_str(&format!("*Location:* `{}`\n\n", map.coordinates));
                }
                StopBlock::BackToOverview => {}
            }
        }
    }
}
