use crate::perimeter::Perimeter;

/// The perimeters of one layer split into the outline of the part and
/// everything else (holes and islands).
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub outer: Perimeter,
    pub inners: Vec<Perimeter>,
}

/// Picks the outer perimeter of a layer. Returns `None` only for a layer
/// without perimeters.
pub trait Classifier: Send + Sync {
    fn classify(&self, perimeters: Vec<Perimeter>) -> Option<Classified>;
}

/// The perimeter reaching furthest along +x, measured on segment start
/// points only, is the outer one. Ties go to the earlier perimeter.
///
/// This holds for a single part whose holes stay inside its x extent. A
/// layer cutting through several separate parts still only gets one outer
/// perimeter.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxStartX;

impl Classifier for MaxStartX {
    fn classify(&self, mut perimeters: Vec<Perimeter>) -> Option<Classified> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, perimeter) in perimeters.iter().enumerate() {
            let score = perimeter.max_start_x();
            if best.map_or(true, |(_, max)| score > max) {
                best = Some((idx, score));
            }
        }

        let (outer, _) = best?;
        let outer = perimeters.remove(outer);
        Some(Classified {
            outer,
            inners: perimeters,
        })
    }
}
