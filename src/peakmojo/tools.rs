//! The PeakMojo tool catalog
//!
//! Every tool maps onto exactly one PeakMojo endpoint. Arguments are checked
//! against the tool's input schema first, then decoded into [`PeakMojoCall`],
//! which knows the endpoint for each variant.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::api::ApiRequest;
use crate::mcp::tools::{ToolDescriptor, ToolError, ToolOperation, ToolRegistry};
use crate::utils::error::McpResult;

#[derive(Debug, Clone, Copy)]
enum ParamKind {
    Id,
    Object,
    ObjectList,
}

#[derive(Debug)]
struct Param {
    name: &'static str,
    kind: ParamKind,
    description: &'static str,
}

#[derive(Debug)]
struct ToolSpec {
    name: &'static str,
    description: &'static str,
    params: &'static [Param],
}

const fn id(name: &'static str, description: &'static str) -> Param {
    Param {
        name,
        kind: ParamKind::Id,
        description,
    }
}

const fn object(name: &'static str, description: &'static str) -> Param {
    Param {
        name,
        kind: ParamKind::Object,
        description,
    }
}

const CATALOG: &[ToolSpec] = &[
    ToolSpec {
        name: "get_peakmojo_users",
        description: "Get list of PeakMojo users",
        params: &[],
    },
    ToolSpec {
        name: "get_peakmojo_user",
        description: "Get PeakMojo user details by ID",
        params: &[id("user_id", "PeakMojo User ID to retrieve")],
    },
    ToolSpec {
        name: "get_peakmojo_user_stats",
        description: "Get PeakMojo user statistics by ID",
        params: &[id("user_id", "PeakMojo User ID to retrieve stats for")],
    },
    ToolSpec {
        name: "update_peakmojo_user_stats",
        description: "Update PeakMojo user statistics",
        params: &[object("stats", "PeakMojo user statistics to update")],
    },
    ToolSpec {
        name: "get_peakmojo_personas",
        description: "Get list of PeakMojo personas",
        params: &[],
    },
    ToolSpec {
        name: "get_peakmojo_persona_tags",
        description: "Get PeakMojo persona tags",
        params: &[],
    },
    ToolSpec {
        name: "search_peakmojo_personas",
        description: "Search for PeakMojo personas",
        params: &[],
    },
    ToolSpec {
        name: "create_peakmojo_persona",
        description: "Create a new PeakMojo persona",
        params: &[object("persona", "PeakMojo persona details")],
    },
    ToolSpec {
        name: "get_peakmojo_scenarios",
        description: "Get list of PeakMojo scenarios",
        params: &[],
    },
    ToolSpec {
        name: "create_peakmojo_job_scenario",
        description: "Create a new PeakMojo job scenario",
        params: &[object("scenario", "PeakMojo job scenario details")],
    },
    ToolSpec {
        name: "get_workspace_personas",
        description: "Get personas for a workspace",
        params: &[id("workspace_id", "Workspace ID")],
    },
    ToolSpec {
        name: "get_job",
        description: "Get job details",
        params: &[id("job_id", "Job ID")],
    },
    ToolSpec {
        name: "get_application",
        description: "Get application details",
        params: &[id("app_id", "Application ID")],
    },
    ToolSpec {
        name: "get_practice_messages",
        description: "Get practice messages",
        params: &[id("practice_id", "Practice ID")],
    },
    ToolSpec {
        name: "get_user_skills",
        description: "Get user skills",
        params: &[id("user_id", "User ID")],
    },
    ToolSpec {
        name: "get_certificates",
        description: "Get list of PeakMojo certificates",
        params: &[],
    },
    ToolSpec {
        name: "get_certificate_skills",
        description: "Get skills for a certificate",
        params: &[id("certificate_id", "Certificate ID")],
    },
    ToolSpec {
        name: "issue_user_certificate",
        description: "Issue a certificate to a user",
        params: &[id("user_id", "User ID"), id("certificate_id", "Certificate ID")],
    },
    ToolSpec {
        name: "add_certificate_skill_courses",
        description: "Add courses to a certificate skill",
        params: &[
            id("certificate_id", "Certificate ID"),
            id("skill_id", "Skill ID"),
            Param {
                name: "courses",
                kind: ParamKind::ObjectList,
                description: "List of courses to add",
            },
        ],
    },
];

impl ToolSpec {
    fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| {
                let schema = match p.kind {
                    ParamKind::Id => {
                        json!({"type": "string", "minLength": 1, "description": p.description})
                    }
                    ParamKind::Object => json!({"type": "object", "description": p.description}),
                    ParamKind::ObjectList => json!({
                        "type": "array",
                        "description": p.description,
                        "items": {"type": "object"}
                    }),
                };
                (p.name.to_string(), schema)
            })
            .collect();
        let required: Vec<&str> = self.params.iter().map(|p| p.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}

/// Output schema shared by every catalog tool
pub fn output_schema() -> Value {
    json!({"type": ["object", "array"]})
}

/// A decoded PeakMojo tool call
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum PeakMojoCall {
    /// `GET /v1/users`
    GetPeakmojoUsers {},
    /// `GET /v1/users/{user_id}`
    GetPeakmojoUser {
        /// User to fetch
        user_id: String,
    },
    /// `GET /v1/users/{user_id}/stats`
    GetPeakmojoUserStats {
        /// User whose stats to fetch
        user_id: String,
    },
    /// `POST /v1/users/stats`
    UpdatePeakmojoUserStats {
        /// Stats payload, sent as the body
        stats: Map<String, Value>,
    },
    /// `GET /v1/personas/peakmojo_personas`
    GetPeakmojoPersonas {},
    /// `GET /v1/personas/tags`
    GetPeakmojoPersonaTags {},
    /// `GET /v1/personas/search`
    SearchPeakmojoPersonas {},
    /// `POST /v1/personas`
    CreatePeakmojoPersona {
        /// Persona payload, sent as the body
        persona: Map<String, Value>,
    },
    /// `GET /v1/scenarios/peakmojo_scenarios`
    GetPeakmojoScenarios {},
    /// `POST /v1/job_scenarios`
    CreatePeakmojoJobScenario {
        /// Scenario payload, sent as the body
        scenario: Map<String, Value>,
    },
    /// `GET /v1/workspaces/{workspace_id}/personas`
    GetWorkspacePersonas {
        /// Workspace to list
        workspace_id: String,
    },
    /// `GET /v1/job/{job_id}`
    GetJob {
        /// Job to fetch
        job_id: String,
    },
    /// `GET /v1/applications/{app_id}`
    GetApplication {
        /// Application to fetch
        app_id: String,
    },
    /// `GET /v1/practices/{practice_id}/messages`
    GetPracticeMessages {
        /// Practice session whose messages to fetch
        practice_id: String,
    },
    /// `GET /v1/users/{user_id}/skills`
    GetUserSkills {
        /// User whose skills to fetch
        user_id: String,
    },
    /// `GET /v1/certificates`
    GetCertificates {},
    /// `GET /v1/certificates/{certificate_id}/skills`
    GetCertificateSkills {
        /// Certificate to inspect
        certificate_id: String,
    },
    /// `POST /v1/users/{user_id}/certificates/{certificate_id}/issue`
    IssueUserCertificate {
        /// Recipient
        user_id: String,
        /// Certificate to issue
        certificate_id: String,
    },
    /// `POST /v1/certificates/{certificate_id}/skills/{skill_id}/courses`
    AddCertificateSkillCourses {
        /// Certificate owning the skill
        certificate_id: String,
        /// Skill receiving the courses
        skill_id: String,
        /// Course payloads, sent as the body
        courses: Vec<Map<String, Value>>,
    },
}

impl PeakMojoCall {
    /// Decode the call named `name` from already-validated arguments
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, ToolError> {
        serde_json::from_value(json!({"name": name, "arguments": arguments}))
            .map_err(|e| ToolError::invalid_arguments(format!("Invalid arguments for {}: {}", name, e)))
    }

    /// The endpoint this call maps to
    pub fn to_request(&self) -> ApiRequest {
        use PeakMojoCall::*;

        match self {
            GetPeakmojoUsers {} => ApiRequest::get(["v1", "users"]),
            GetPeakmojoUser { user_id } => ApiRequest::get(["v1", "users", user_id.as_str()]),
            GetPeakmojoUserStats { user_id } => {
                ApiRequest::get(["v1", "users", user_id.as_str(), "stats"])
            }
            UpdatePeakmojoUserStats { stats } => {
                with_object_body(ApiRequest::post(["v1", "users", "stats"]), stats)
            }
            GetPeakmojoPersonas {} => ApiRequest::get(["v1", "personas", "peakmojo_personas"]),
            GetPeakmojoPersonaTags {} => ApiRequest::get(["v1", "personas", "tags"]),
            SearchPeakmojoPersonas {} => ApiRequest::get(["v1", "personas", "search"]),
            CreatePeakmojoPersona { persona } => {
                with_object_body(ApiRequest::post(["v1", "personas"]), persona)
            }
            GetPeakmojoScenarios {} => ApiRequest::get(["v1", "scenarios", "peakmojo_scenarios"]),
            CreatePeakmojoJobScenario { scenario } => {
                with_object_body(ApiRequest::post(["v1", "job_scenarios"]), scenario)
            }
            GetWorkspacePersonas { workspace_id } => {
                ApiRequest::get(["v1", "workspaces", workspace_id.as_str(), "personas"])
            }
            GetJob { job_id } => ApiRequest::get(["v1", "job", job_id.as_str()]),
            GetApplication { app_id } => ApiRequest::get(["v1", "applications", app_id.as_str()]),
            GetPracticeMessages { practice_id } => {
                ApiRequest::get(["v1", "practices", practice_id.as_str(), "messages"])
            }
            GetUserSkills { user_id } => ApiRequest::get(["v1", "users", user_id.as_str(), "skills"]),
            GetCertificates {} => ApiRequest::get(["v1", "certificates"]),
            GetCertificateSkills { certificate_id } => {
                ApiRequest::get(["v1", "certificates", certificate_id.as_str(), "skills"])
            }
            IssueUserCertificate {
                user_id,
                certificate_id,
            } => ApiRequest::post([
                "v1",
                "users",
                user_id.as_str(),
                "certificates",
                certificate_id.as_str(),
                "issue",
            ]),
            AddCertificateSkillCourses {
                certificate_id,
                skill_id,
                courses,
            } => ApiRequest::post([
                "v1",
                "certificates",
                certificate_id.as_str(),
                "skills",
                skill_id.as_str(),
                "courses",
            ])
            .with_body(json!({ "courses": courses })),
        }
    }
}

/// Attach `object` as the JSON body unless it is empty
fn with_object_body(request: ApiRequest, object: &Map<String, Value>) -> ApiRequest {
    if object.is_empty() {
        request
    } else {
        request.with_body(Value::Object(object.clone()))
    }
}

#[derive(Debug)]
struct PeakMojoOperation {
    tool: &'static str,
}

impl ToolOperation for PeakMojoOperation {
    fn build_request(&self, arguments: &Value) -> Result<ApiRequest, ToolError> {
        PeakMojoCall::parse(self.tool, arguments).map(|call| call.to_request())
    }
}

/// Names of every catalog tool, in registration order
pub fn tool_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|spec| spec.name)
}

/// Register the whole catalog
pub fn register_tools(registry: &mut ToolRegistry) -> McpResult<()> {
    for spec in CATALOG {
        let descriptor = ToolDescriptor::new(
            spec.name,
            spec.description,
            spec.input_schema(),
            output_schema(),
            Arc::new(PeakMojoOperation { tool: spec.name }),
        )?;
        registry.register(descriptor)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn request_for(name: &str, arguments: Value) -> ApiRequest {
        PeakMojoCall::parse(name, &arguments).unwrap().to_request()
    }

    #[test]
    fn test_catalog_registers() {
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry).unwrap();
        assert_eq!(registry.len(), 19);
        let names: Vec<_> = registry.list().map(|t| t.name.clone()).collect();
        assert_eq!(names, tool_names().collect::<Vec<_>>());
    }

    #[test]
    fn test_every_catalog_tool_decodes() {
        for spec in CATALOG {
            let arguments: Map<String, Value> = spec
                .params
                .iter()
                .map(|p| {
                    let value = match p.kind {
                        ParamKind::Id => json!("id-1"),
                        ParamKind::Object => json!({"k": "v"}),
                        ParamKind::ObjectList => json!([{"course": "c1"}]),
                    };
                    (p.name.to_string(), value)
                })
                .collect();
            assert!(
                PeakMojoCall::parse(spec.name, &Value::Object(arguments)).is_ok(),
                "{} did not decode",
                spec.name
            );
        }
    }

    #[test]
    fn test_endpoints() {
        let cases = vec![
            ("get_peakmojo_users", json!({}), Method::GET, "/v1/users"),
            ("get_peakmojo_user", json!({"user_id": "u1"}), Method::GET, "/v1/users/u1"),
            ("get_peakmojo_user_stats", json!({"user_id": "u1"}), Method::GET, "/v1/users/u1/stats"),
            ("update_peakmojo_user_stats", json!({"stats": {"a": 1}}), Method::POST, "/v1/users/stats"),
            ("get_peakmojo_personas", json!({}), Method::GET, "/v1/personas/peakmojo_personas"),
            ("get_peakmojo_persona_tags", json!({}), Method::GET, "/v1/personas/tags"),
            ("search_peakmojo_personas", json!({}), Method::GET, "/v1/personas/search"),
            ("create_peakmojo_persona", json!({"persona": {}}), Method::POST, "/v1/personas"),
            ("get_peakmojo_scenarios", json!({}), Method::GET, "/v1/scenarios/peakmojo_scenarios"),
            ("create_peakmojo_job_scenario", json!({"scenario": {}}), Method::POST, "/v1/job_scenarios"),
            ("get_workspace_personas", json!({"workspace_id": "w"}), Method::GET, "/v1/workspaces/w/personas"),
            ("get_job", json!({"job_id": "j"}), Method::GET, "/v1/job/j"),
            ("get_application", json!({"app_id": "a"}), Method::GET, "/v1/applications/a"),
            ("get_practice_messages", json!({"practice_id": "p"}), Method::GET, "/v1/practices/p/messages"),
            ("get_user_skills", json!({"user_id": "u"}), Method::GET, "/v1/users/u/skills"),
            ("get_certificates", json!({}), Method::GET, "/v1/certificates"),
            ("get_certificate_skills", json!({"certificate_id": "c"}), Method::GET, "/v1/certificates/c/skills"),
            (
                "issue_user_certificate",
                json!({"user_id": "u", "certificate_id": "c"}),
                Method::POST,
                "/v1/users/u/certificates/c/issue",
            ),
            (
                "add_certificate_skill_courses",
                json!({"certificate_id": "c", "skill_id": "s", "courses": []}),
                Method::POST,
                "/v1/certificates/c/skills/s/courses",
            ),
        ];
        assert_eq!(cases.len(), CATALOG.len());

        for (name, arguments, method, path) in cases {
            let request = request_for(name, arguments);
            assert_eq!(request.method, method, "{}", name);
            assert_eq!(request.path(), path, "{}", name);
        }
    }

    #[test]
    fn test_bodies() {
        let request = request_for("update_peakmojo_user_stats", json!({"stats": {"score": 9}}));
        assert_eq!(request.body, Some(json!({"score": 9})));

        let request = request_for("issue_user_certificate", json!({"user_id": "u", "certificate_id": "c"}));
        assert_eq!(request.body, None);

        let request = request_for(
            "add_certificate_skill_courses",
            json!({"certificate_id": "c", "skill_id": "s", "courses": [{"title": "Rust"}]}),
        );
        assert_eq!(request.body, Some(json!({"courses": [{"title": "Rust"}]})));
    }

    #[test]
    fn test_empty_objects_send_no_body() {
        for (name, key) in [
            ("update_peakmojo_user_stats", "stats"),
            ("create_peakmojo_persona", "persona"),
            ("create_peakmojo_job_scenario", "scenario"),
        ] {
            let request = request_for(name, json!({ key: {} }));
            assert_eq!(request.body, None, "{}", name);

            let request = request_for(name, json!({ key: {"name": "Ada"} }));
            assert_eq!(request.body, Some(json!({"name": "Ada"})), "{}", name);
        }
    }

    #[test]
    fn test_unknown_name_fails_to_decode() {
        assert!(PeakMojoCall::parse("drop_tables", &json!({})).is_err());
    }

    #[test]
    fn test_input_schema_shape() {
        let spec = CATALOG
            .iter()
            .find(|s| s.name == "issue_user_certificate")
            .unwrap();
        let schema = spec.input_schema();
        assert_eq!(schema["required"], json!(["user_id", "certificate_id"]));
        assert_eq!(schema["properties"]["user_id"]["type"], json!("string"));
    }
}
