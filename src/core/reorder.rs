//! Output ordering by pseudonym
//!
//! Input order can encode sensitive sequence information, so every output
//! (CSV rows, JSON sessions, TIF/SHA file creation) is ordered purely by pseudonym.

use crate::domain::ReorderError;

/// Sorts pseudonyms lexicographically and returns them with any duplicates
///
/// Duplicates only occur when two records share tabulator, batch and record ID.
pub fn pseudonym_order<P: Ord + Clone>(pseudonyms: &[P]) -> (Vec<P>, Vec<P>) {
    let mut order = pseudonyms.to_vec();
    order.sort();

    let mut duplicates: Vec<P> = order
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| pair[0].clone())
        .collect();
    duplicates.dedup();

    (order, duplicates)
}

/// Arranges `items` so that position `n` holds an item labelled `order[n]`
///
/// `labels` is index-aligned with `items`. Each target label takes the first item
/// with that label that has not been placed yet.
///
/// # Examples
///
/// ```
/// use cvr_sanitizer::core::reorder::arrange;
///
/// let items = ["three", "one", "two"];
/// let arranged = arrange(&items, &["3", "1", "2"], &["1", "2", "3"]).unwrap();
/// assert_eq!(arranged, vec![&"one", &"two", &"three"]);
/// ```
pub fn arrange<'a, T, L, O>(
    items: &'a [T],
    labels: &[L],
    order: &[O],
) -> Result<Vec<&'a T>, ReorderError>
where
    L: AsRef<str>,
    O: AsRef<str>,
{
    if labels.len() != items.len() {
        return Err(ReorderError::LengthMismatch {
            expected: items.len(),
            found: labels.len(),
        });
    }
    if order.len() != items.len() {
        return Err(ReorderError::LengthMismatch {
            expected: items.len(),
            found: order.len(),
        });
    }

    let mut placed = vec![false; items.len()];
    let mut arranged = Vec::with_capacity(items.len());
    for target in order {
        let target = target.as_ref();
        let position = labels
            .iter()
            .zip(placed.iter())
            .position(|(label, done)| !done && label.as_ref() == target);

        match position {
            Some(index) => {
                placed[index] = true;
                arranged.push(&items[index]);
            }
            None => {
                return Err(ReorderError::UnknownPseudonym {
                    pseudonym: target.to_string(),
                    labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
                    order: order.iter().map(|o| o.as_ref().to_string()).collect(),
                })
            }
        }
    }

    Ok(arranged)
}

/// Sorts rows by the value in `column`, then by the full row
///
/// The full-row tie break keeps the result independent of input order.
pub fn sort_rows_by_column(rows: &mut [Vec<String>], column: usize) {
    rows.sort_by(|left, right| {
        left.get(column)
            .cmp(&right.get(column))
            .then_with(|| left.cmp(right))
    });
}

/// Blanks `column` in every row
pub fn blank_column(rows: &mut [Vec<String>], column: usize) {
    for row in rows {
        if let Some(field) = row.get_mut(column) {
            field.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrange_follows_target_order() {
        let sessions = ["session-3", "session-1", "session-2"];
        let arranged = arrange(&sessions, &["3", "1", "2"], &["1", "2", "3"]).unwrap();
        assert_eq!(arranged, vec![&"session-1", &"session-2", &"session-3"]);
    }

    #[test]
    fn test_arrange_unknown_label() {
        let err = arrange(&["a", "b"], &["1", "2"], &["1", "9"]).unwrap_err();
        assert!(matches!(err, ReorderError::UnknownPseudonym { ref pseudonym, .. } if pseudonym == "9"));
    }

    #[test]
    fn test_arrange_duplicate_labels_use_each_item_once() {
        let items = ["first", "second", "third"];
        let arranged = arrange(&items, &["x", "y", "x"], &["x", "x", "y"]).unwrap();
        assert_eq!(arranged, vec![&"first", &"third", &"second"]);

        // A third "x" has nothing left to take
        assert!(arrange(&items, &["x", "y", "x"], &["x", "x", "x"]).is_err());
    }

    #[test]
    fn test_arrange_length_mismatch() {
        assert_eq!(
            arrange(&["a", "b"], &["1", "2"], &["1"]).unwrap_err(),
            ReorderError::LengthMismatch {
                expected: 2,
                found: 1
            }
        );
        assert!(arrange(&["a"], &["1", "2"], &["1"]).is_err());
    }

    #[test]
    fn test_pseudonym_order_reports_duplicates() {
        let (order, duplicates) = pseudonym_order(&["c", "a", "b", "a", "c", "a"]);
        assert_eq!(order, vec!["a", "a", "a", "b", "c", "c"]);
        assert_eq!(duplicates, vec!["a", "c"]);

        let (_, none) = pseudonym_order(&["b", "a"]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_sort_rows_is_independent_of_input_order() {
        let row = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        let mut forward = vec![
            row(&["1", "0xbb", "x"]),
            row(&["2", "0xaa", "y"]),
            row(&["3", "0xaa", "x"]),
        ];
        let mut backward: Vec<_> = forward.iter().rev().cloned().collect();

        sort_rows_by_column(&mut forward, 1);
        sort_rows_by_column(&mut backward, 1);
        assert_eq!(forward, backward);
        assert_eq!(forward[0][1], "0xaa");
        assert_eq!(forward[2][1], "0xbb");

        blank_column(&mut forward, 0);
        assert!(forward.iter().all(|r| r[0].is_empty()));
    }
}
