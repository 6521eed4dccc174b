use onshell_core::{Amplitude, Leg, Vertex};

fn vertex_matches(vertex: &Vertex, mother: &Leg, daughters: [&Leg; 2]) -> bool {
    let [first, second] = daughters;
    vertex.legs.contains(first)
        && vertex.legs.contains(second)
        && vertex.legs.iter().any(|leg| leg.id.abs() == mother.id.abs())
}

/// Returns the indices of the diagrams containing the `mother -> daughters` splitting vertex.
///
/// Daughters are compared as full legs (id, state and number). The mother is matched on the
/// absolute id only since the propagator may appear with either orientation. Each diagram is
/// reported at most once, in diagram order.
pub fn find_os_diagrams(amplitude: &Amplitude, mother: &Leg, daughters: [&Leg; 2]) -> Vec<usize> {
    amplitude
        .diagrams
        .iter()
        .enumerate()
        .filter(|(_, diagram)| {
            diagram
                .vertices
                .iter()
                .any(|vertex| vertex_matches(vertex, mother, daughters))
        })
        .map(|(idx, _)| idx)
        .collect()
}
