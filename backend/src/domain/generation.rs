//! Generation inference for newly created or relinked members.
//!
//! Generation is advisory display data, so every input degrades to a default
//! instead of failing. Values are stored string-encoded on the member.

use log::debug;
use shared::{parse_generation, GenerationBaseline, RelationshipType};

use crate::domain::models::member::FamilyMember;

/// Compute the generation of a member linked to another member whose stored
/// generation is `related_generation`.
///
/// - no link: the configured root baseline
/// - parent link: parent's generation + 1, or 1 when the parent's generation
///   is missing or not an integer
/// - spouse link: spouse's generation, or 0 when missing or not an integer
pub fn infer_generation(
    relationship_type: RelationshipType,
    related_generation: Option<&str>,
    baseline: GenerationBaseline,
) -> i32 {
    let parsed = parse_generation(related_generation);
    let generation = match relationship_type {
        RelationshipType::None => baseline.value(),
        RelationshipType::Parent => parsed.unwrap_or(0).saturating_add(1),
        RelationshipType::Spouse => parsed.unwrap_or(0),
    };

    debug!(
        "Inferred generation {} for {} link (related generation {:?})",
        generation, relationship_type, related_generation
    );
    generation
}

/// [`infer_generation`] against a stored member record
pub fn infer_generation_for(
    relationship_type: RelationshipType,
    related_member: Option<&FamilyMember>,
    baseline: GenerationBaseline,
) -> i32 {
    infer_generation(
        relationship_type,
        related_member.and_then(|m| m.generation.as_deref()),
        baseline,
    )
}

/// String encoding used when a generation is persisted
pub fn encode_generation(generation: i32) -> String {
    generation.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_link_adds_one() {
        assert_eq!(infer_generation(RelationshipType::Parent, Some("3"), GenerationBaseline::Zero), 4);
        assert_eq!(infer_generation(RelationshipType::Parent, Some("0"), GenerationBaseline::One), 1);
        assert_eq!(infer_generation(RelationshipType::Parent, Some("-2"), GenerationBaseline::Zero), -1);
    }

    #[test]
    fn test_spouse_link_keeps_generation() {
        assert_eq!(infer_generation(RelationshipType::Spouse, Some("2"), GenerationBaseline::Zero), 2);
        assert_eq!(infer_generation(RelationshipType::Spouse, Some("7"), GenerationBaseline::One), 7);
    }

    #[test]
    fn test_missing_generation_defaults() {
        assert_eq!(infer_generation(RelationshipType::Parent, None, GenerationBaseline::Zero), 1);
        assert_eq!(infer_generation(RelationshipType::Spouse, None, GenerationBaseline::Zero), 0);
    }

    #[test]
    fn test_unparseable_generation_defaults() {
        assert_eq!(infer_generation(RelationshipType::Parent, Some("second"), GenerationBaseline::Zero), 1);
        assert_eq!(infer_generation(RelationshipType::Spouse, Some(""), GenerationBaseline::Zero), 0);
        assert_eq!(infer_generation(RelationshipType::Parent, Some("2.5"), GenerationBaseline::Zero), 1);
    }

    #[test]
    fn test_root_uses_configured_baseline() {
        assert_eq!(infer_generation(RelationshipType::None, None, GenerationBaseline::Zero), 0);
        assert_eq!(infer_generation(RelationshipType::None, None, GenerationBaseline::One), 1);
        // The related generation is ignored for roots
        assert_eq!(infer_generation(RelationshipType::None, Some("5"), GenerationBaseline::One), 1);
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        let max = i32::MAX.to_string();
        assert_eq!(infer_generation(RelationshipType::Parent, Some(&max), GenerationBaseline::Zero), i32::MAX);
    }

    #[test]
    fn test_encode_generation() {
        assert_eq!(encode_generation(4), "4");
    }
}
