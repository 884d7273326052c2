use serde::Serialize;

use super::{Name, SkillId, ValidationError, WorkspaceId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    #[serde(skip_serializing)]
    pub workspace_id: WorkspaceId,
    pub name: Name,
}

impl Skill {
    pub fn new(workspace_id: WorkspaceId, name: Name) -> Self {
        Self {
            id: SkillId::default(),
            workspace_id,
            name,
        }
    }

    pub fn parse_name(name: &str) -> Result<Name, ValidationError> {
        Name::parse("Skill name", name)
    }

    /// Skill names are unique per workspace regardless of case.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.as_ref().to_lowercase() == name.trim().to_lowercase()
    }
}

#[test]
fn test_skill_names_match_case_insensitively() {
    let skill = Skill::new(
        WorkspaceId::default(),
        Skill::parse_name("Motion Design").unwrap(),
    );
    assert!(skill.matches_name("motion design"));
    assert!(skill.matches_name(" MOTION DESIGN "));
    assert!(!skill.matches_name("motion"));
}
