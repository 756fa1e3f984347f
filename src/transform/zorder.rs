use crate::element::CanvasElement;
use crate::id_generator::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderOp {
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
}

/// zIndex writes needed to carry out `op` on the selected element.
///
/// Empty when nothing is selected, the id is unknown, or there is no
/// neighbour to swap with. Among equal neighbours the earliest in list
/// order is chosen.
pub fn plan_z_order(
    elements: &[CanvasElement],
    selected: Option<&ElementId>,
    op: ZOrderOp,
) -> Vec<(ElementId, i64)> {
    let Some(selected) = selected.and_then(|id| elements.iter().find(|e| &e.id == id)) else {
        return Vec::new();
    };
    let z = selected.z_index;

    match op {
        ZOrderOp::BringToFront => {
            let max = elements.iter().map(|e| e.z_index).max().unwrap_or(z);
            vec![(selected.id.clone(), max + 1)]
        }
        ZOrderOp::SendToBack => {
            let min = elements.iter().map(|e| e.z_index).min().unwrap_or(z);
            vec![(selected.id.clone(), min - 1)]
        }
        ZOrderOp::BringForward => {
            let above = elements
                .iter()
                .filter(|e| e.z_index > z)
                .fold(None, |best: Option<&CanvasElement>, e| match best {
                    Some(b) if b.z_index <= e.z_index => Some(b),
                    _ => Some(e),
                });
            swap(selected, above)
        }
        ZOrderOp::SendBackward => {
            let below = elements
                .iter()
                .filter(|e| e.z_index < z)
                .fold(None, |best: Option<&CanvasElement>, e| match best {
                    Some(b) if b.z_index >= e.z_index => Some(b),
                    _ => Some(e),
                });
            swap(selected, below)
        }
    }
}

fn swap(selected: &CanvasElement, neighbour: Option<&CanvasElement>) -> Vec<(ElementId, i64)> {
    match neighbour {
        Some(other) => vec![
            (selected.id.clone(), other.z_index),
            (other.id.clone(), selected.z_index),
        ],
        None => Vec::new(),
    }
}
