/*
 * Pure functions turning the current selections and history lists into
 * render descriptors for the platform layer. Nothing here touches storage;
 * the presenter loads the data and passes it in.
 */
use super::ui_constants;
use crate::core::history::{find_entry, sorted_by_recency};
use crate::core::identifiers::{format_uuid_short, ids_match, parse_tag_ids};
use crate::core::{HistoryEntry, HistoryKind};
use crate::platform_layer::{
    ChipDescriptor, DisplayDescriptor, DropdownDescriptor, DropdownRowDescriptor,
};

// The alias of the matching history entry if it has one, else the short id.
pub fn chip_label(id: &str, history: &[HistoryEntry]) -> String {
    find_entry(history, id)
        .and_then(HistoryEntry::display_alias)
        .map(str::to_string)
        .unwrap_or_else(|| format_uuid_short(id))
}

fn chip(id: &str, history: &[HistoryEntry]) -> ChipDescriptor {
    ChipDescriptor {
        id: id.to_string(),
        label: chip_label(id, history),
    }
}

pub fn render_account_display(
    current: &str,
    history: &[HistoryEntry],
    is_editing: bool,
) -> DisplayDescriptor {
    let current = current.trim();
    let chips = if current.is_empty() {
        Vec::new()
    } else {
        vec![chip(current, history)]
    };
    DisplayDescriptor {
        is_empty: chips.is_empty(),
        chips,
        is_editing,
    }
}

// One chip per token of the selection string, in selection order.
pub fn render_tags_display(
    current: &str,
    history: &[HistoryEntry],
    is_editing: bool,
) -> DisplayDescriptor {
    let chips: Vec<ChipDescriptor> = parse_tag_ids(current)
        .iter()
        .map(|id| chip(id, history))
        .collect();
    DisplayDescriptor {
        is_empty: chips.is_empty(),
        chips,
        is_editing,
    }
}

/*
 * Rows sorted most recently used first. Tag rows carry a checkbox that is
 * checked when the id is part of `selected_tag_ids`; account rows carry none.
 */
pub fn render_dropdown(
    kind: HistoryKind,
    history: &[HistoryEntry],
    selected_tag_ids: &[String],
) -> DropdownDescriptor {
    let multi_select = kind == HistoryKind::Tags;
    let rows = sorted_by_recency(history)
        .into_iter()
        .map(|entry| {
            let checked = multi_select.then(|| {
                selected_tag_ids
                    .iter()
                    .any(|selected| ids_match(selected, &entry.id))
            });
            DropdownRowDescriptor {
                label: chip_label(&entry.id, history),
                id: entry.id,
                checked,
            }
        })
        .collect();
    let empty_text = match kind {
        HistoryKind::Accounts => ui_constants::ACCOUNT_DROPDOWN_EMPTY_TEXT,
        HistoryKind::Tags => ui_constants::TAGS_DROPDOWN_EMPTY_TEXT,
    };
    DropdownDescriptor {
        rows,
        empty_text: empty_text.to_string(),
        multi_select,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID_A: &str = "550e8400-e29b-41d4-a716-446655440000";
    const ID_B: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn history() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry::new(ID_A, "  Broker  ", 10),
            HistoryEntry::new(ID_B, "   ", 20),
        ]
    }

    #[test]
    fn test_chip_label_prefers_trimmed_alias() {
        assert_eq!(chip_label(&ID_A.to_uppercase(), &history()), "Broker");
        assert_eq!(chip_label(ID_B, &history()), "6ba7…30c8");
        assert_eq!(chip_label("abc", &[]), "abc");
    }

    #[test]
    fn test_account_display_empty_and_filled() {
        let empty = render_account_display("  ", &history(), true);
        assert!(empty.is_empty);
        assert!(empty.is_editing);
        assert!(empty.chips.is_empty());

        let filled = render_account_display(ID_A, &history(), false);
        assert!(!filled.is_empty);
        assert_eq!(
            filled.chips,
            vec![ChipDescriptor {
                id: ID_A.to_string(),
                label: "Broker".to_string()
            }]
        );
    }

    #[test]
    fn test_tags_display_keeps_selection_order_and_unknown_ids() {
        let unknown = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        let display = render_tags_display(&format!("{ID_B}, {unknown},{ID_A}"), &history(), false);
        let labels: Vec<&str> = display.chips.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["6ba7…30c8", "7c9e…0ae7", "Broker"]);
    }

    #[test]
    fn test_account_dropdown_rows_are_recency_sorted_without_checkboxes() {
        let dropdown = render_dropdown(HistoryKind::Accounts, &history(), &[]);
        assert!(!dropdown.multi_select);
        let ids: Vec<&str> = dropdown.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![ID_B, ID_A]);
        assert!(dropdown.rows.iter().all(|r| r.checked.is_none()));
    }

    #[test]
    fn test_tag_dropdown_marks_selected_rows_case_insensitively() {
        let selected = vec![ID_A.to_uppercase()];
        let dropdown = render_dropdown(HistoryKind::Tags, &history(), &selected);
        assert!(dropdown.multi_select);
        assert_eq!(dropdown.rows[0].checked, Some(false));
        assert_eq!(dropdown.rows[1].checked, Some(true));
    }

    #[test]
    fn test_empty_dropdowns_carry_their_empty_text() {
        assert_eq!(
            render_dropdown(HistoryKind::Accounts, &[], &[]).empty_text,
            "No history yet"
        );
        assert_eq!(
            render_dropdown(HistoryKind::Tags, &[], &[]).empty_text,
            "No tags yet"
        );
    }
}
