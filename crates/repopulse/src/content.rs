use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::Path;

// ============================================================================
// Content kinds
// ============================================================================

/// The fixed set of payload kinds the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Markdown,
    Json,
    Text,
    Python,
    JavaScript,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Markdown,
        ContentKind::Json,
        ContentKind::Text,
        ContentKind::Python,
        ContentKind::JavaScript,
    ];

    /// File extension for this kind, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ContentKind::Markdown => ".md",
            ContentKind::Json => ".json",
            ContentKind::Text => ".txt",
            ContentKind::Python => ".py",
            ContentKind::JavaScript => ".js",
        }
    }

    /// Pick a kind uniformly at random.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> ContentKind {
        *ContentKind::ALL.choose(rng).unwrap_or(&ContentKind::Text)
    }
}

/// A generated file, path relative to the configured base directory.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub relative_path: String,
    pub kind: ContentKind,
}

// ============================================================================
// Generation
// ============================================================================

const FILE_PREFIXES: [&str; 7] = [
    "data",
    "config",
    "sample",
    "test",
    "demo",
    "temp",
    "generated",
];

/// Build a timestamped filename whose extension matches the kind,
/// e.g. `sample_20250917_163556.json`.
pub fn generate_file_name<R: Rng + ?Sized>(
    kind: ContentKind,
    rng: &mut R,
    now: DateTime<Local>,
) -> String {
    let prefix = FILE_PREFIXES.choose(rng).unwrap_or(&"data");
    format!(
        "{}_{}{}",
        prefix,
        now.format("%Y%m%d_%H%M%S"),
        kind.extension()
    )
}

/// Produce the textual payload for a kind. Generation itself cannot fail;
/// only the write to disk (see [`write_generated`]) is fallible.
pub fn generate_body<R: Rng + ?Sized>(
    kind: ContentKind,
    rng: &mut R,
    now: DateTime<Local>,
) -> String {
    match kind {
        ContentKind::Markdown => markdown_body(rng, now),
        ContentKind::Json => json_body(rng, now),
        ContentKind::Text => text_body(rng, now),
        ContentKind::Python => python_body(rng, now),
        ContentKind::JavaScript => javascript_body(rng, now),
    }
}

/// Pick a random kind, generate a payload, and write it under
/// `<base_dir>/gen_contents/`, creating the directory as needed.
pub fn write_generated<R: Rng + ?Sized>(base_dir: &Path, rng: &mut R) -> Result<GeneratedFile> {
    let now = Local::now();
    let kind = ContentKind::pick(rng);
    let file_name = generate_file_name(kind, rng, now);
    let body = generate_body(kind, rng, now);

    let dir = base_dir.join("gen_contents");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create content directory {:?}", dir))?;
    let path = dir.join(&file_name);
    std::fs::write(&path, body).with_context(|| format!("failed to write {:?}", path))?;

    Ok(GeneratedFile {
        relative_path: format!("gen_contents/{}", file_name),
        kind,
    })
}

// ============================================================================
// Per-kind templates
// ============================================================================

fn dotted_version<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}.{}.{}",
        rng.random_range(1..=5),
        rng.random_range(0..=9),
        rng.random_range(0..=9)
    )
}

fn markdown_body<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> String {
    const TOPICS: [&str; 10] = [
        "Development",
        "Testing",
        "Documentation",
        "Features",
        "Performance",
        "Architecture",
        "Security",
        "Deployment",
        "Monitoring",
        "Analytics",
    ];
    const SECTIONS: [&str; 6] = [
        "Requirements Analysis",
        "Design Patterns",
        "Implementation Details",
        "Testing Strategy",
        "Performance Optimization",
        "Security Considerations",
    ];
    const OBSERVATIONS: [&str; 3] = [
        "The implementation requires careful consideration of scalability, performance, and maintainability factors.",
        "We have identified several key areas that need immediate attention and long-term planning.",
        "The current architecture supports high availability and fault tolerance through distributed design patterns.",
    ];

    let topic = TOPICS.choose(rng).unwrap_or(&"Development");
    let generated = now.format("%Y-%m-%d %H:%M:%S");

    format!(
        "# {topic} Technical Documentation\n\
         \n\
         Generated on: {generated}\n\
         Document ID: {doc_id}\n\
         Version: {version}\n\
         \n\
         ## Executive Summary\n\
         This document provides information about {topic_lower} implementation in our project. \
         The analysis covers technical requirements, implementation strategies, and best practices.\n\
         \n\
         ## Detailed Analysis\n\
         \n\
         ### {section_a}\n\
         {observation}\n\
         \n\
         #### Key Requirements\n\
         - **Scalability**: Handle {users}K+ concurrent users\n\
         - **Performance**: Response time < {latency}ms\n\
         - **Availability**: {nines_a}.{nines_b}% uptime SLA\n\
         \n\
         ### Performance Metrics\n\
         | Metric | Target | Current |\n\
         |--------|--------|---------|\n\
         | Response Time | <{rt_target}ms | {rt_current}ms |\n\
         | Throughput | {tp_target} RPS | {tp_current} RPS |\n\
         | CPU Usage | <{cpu_target}% | {cpu_current}% |\n\
         \n\
         ## Conclusion\n\
         The {topic_lower} implementation represents a step forward in our technical capabilities.\n\
         \n\
         ---\n\
         *Last Updated: {generated}*\n",
        topic = topic,
        topic_lower = topic.to_lowercase(),
        generated = generated,
        doc_id = rng.random_range(10_000..=99_999),
        version = dotted_version(rng),
        section_a = SECTIONS.choose(rng).unwrap_or(&SECTIONS[0]),
        observation = OBSERVATIONS.choose(rng).unwrap_or(&OBSERVATIONS[0]),
        users = rng.random_range(10..=1_000),
        latency = rng.random_range(100..=500),
        nines_a = rng.random_range(95..=99),
        nines_b = rng.random_range(5..=9),
        rt_target = rng.random_range(100..=300),
        rt_current = rng.random_range(80..=250),
        tp_target = rng.random_range(1_000..=5_000),
        tp_current = rng.random_range(800..=4_500),
        cpu_target = rng.random_range(60..=80),
        cpu_current = rng.random_range(45..=75),
    )
}

fn json_body<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> String {
    const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];
    const REGIONS: [&str; 4] = ["us-east-1", "us-west-2", "eu-west-1", "ap-southeast-1"];
    const PURPOSES: [&str; 4] = [
        "configuration",
        "feature_flags",
        "deployment_settings",
        "monitoring_config",
    ];
    const SERVICES: [&str; 5] = ["auth", "api", "web", "worker", "scheduler"];

    let value = serde_json::json!({
        "metadata": {
            "id": format!("config-{}", rng.random_range(100_000..=999_999)),
            "timestamp": now.to_rfc3339(),
            "version": dotted_version(rng),
            "environment": ENVIRONMENTS.choose(rng).unwrap_or(&ENVIRONMENTS[0]),
            "region": REGIONS.choose(rng).unwrap_or(&REGIONS[0]),
            "created_by": "repopulse",
            "purpose": PURPOSES.choose(rng).unwrap_or(&PURPOSES[0]),
        },
        "application": {
            "name": format!("service-{}", SERVICES.choose(rng).unwrap_or(&SERVICES[0])),
            "port": rng.random_range(3_000..=9_000),
            "protocol": if rng.random_bool(0.5) { "https" } else { "grpc" },
            "health_check": {
                "enabled": true,
                "endpoint": "/health",
                "interval": rng.random_range(10..=60),
                "retries": rng.random_range(2..=5),
            },
        },
        "features": {
            "caching": {
                "enabled": true,
                "max_size": format!("{}MB", rng.random_range(100..=1_000)),
                "default_ttl": rng.random_range(300..=1_800),
            },
            "rate_limiting": {
                "enabled": true,
                "requests_per_minute": rng.random_range(100..=1_000),
                "burst_capacity": rng.random_range(10..=100),
            },
            "monitoring": {
                "enabled": true,
                "metrics_interval": rng.random_range(10..=60),
                "tracing_enabled": rng.random_bool(0.5),
            },
        },
        "deployment": {
            "replicas": rng.random_range(2..=10),
            "auto_scaling": {
                "enabled": true,
                "min_replicas": rng.random_range(2..=5),
                "max_replicas": rng.random_range(10..=50),
                "cpu_threshold": rng.random_range(60..=80),
            },
        },
    });

    serde_json::to_string_pretty(&value).expect("json! literal always serializes")
}

fn text_body<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> String {
    const LABELS: [&str; 5] = ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"];

    let mut lines = vec![
        format!("Generated at: {}", now.format("%Y-%m-%d %H:%M:%S")),
        format!("Random ID: {}", rng.random_range(10_000..=99_999)),
        String::new(),
        "Sample data entries:".to_string(),
    ];

    for i in 0..rng.random_range(3..=8) {
        lines.push(format!(
            "Entry {}: {}-{}",
            i + 1,
            LABELS.choose(rng).unwrap_or(&LABELS[0]),
            rng.random_range(100..=999)
        ));
    }

    lines.push(String::new());
    lines.push("Status: Active".to_string());
    lines.push(format!("Last updated: {}", now.format("%Y-%m-%d")));

    lines.join("\n")
}

const STUB_FUNCTIONS: [&str; 5] = [
    "process_data",
    "calculate_metrics",
    "format_output",
    "validate_input",
    "generate_report",
];

fn python_body<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> String {
    let function = STUB_FUNCTIONS.choose(rng).unwrap_or(&STUB_FUNCTIONS[0]);
    format!(
        "\"\"\"\n\
         Auto-generated Python module\n\
         Created: {created}\n\
         \"\"\"\n\
         \n\
         import random\n\
         from datetime import datetime\n\
         \n\
         \n\
         def {function}(data):\n\
         \x20   \"\"\"Process input data and return a stamped result.\"\"\"\n\
         \x20   return {{\n\
         \x20       'timestamp': datetime.now().isoformat(),\n\
         \x20       'processed': True,\n\
         \x20       'value': random.randint(1, 100),\n\
         \x20   }}\n\
         \n\
         \n\
         if __name__ == \"__main__\":\n\
         \x20   sample_data = {{\"test\": True, \"value\": {value}}}\n\
         \x20   print({function}(sample_data))\n",
        created = now.format("%Y-%m-%d %H:%M:%S"),
        function = function,
        value = rng.random_range(1..=1_000),
    )
}

fn javascript_body<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> String {
    format!(
        "/**\n\
         \x20* Auto-generated JavaScript module\n\
         \x20* Created: {created}\n\
         \x20*/\n\
         \n\
         const config = {{\n\
         \x20   version: '{version}',\n\
         \x20   timestamp: '{timestamp}',\n\
         \x20   settings: {{\n\
         \x20       debug: {debug},\n\
         \x20       timeout: {timeout},\n\
         \x20       retries: {retries},\n\
         \x20   }},\n\
         }};\n\
         \n\
         function processRequest(data) {{\n\
         \x20   return {{\n\
         \x20       ...data,\n\
         \x20       processed: true,\n\
         \x20       timestamp: new Date().toISOString(),\n\
         \x20   }};\n\
         }}\n\
         \n\
         module.exports = {{ config, processRequest }};\n",
        created = now.format("%Y-%m-%d %H:%M:%S"),
        version = dotted_version(rng),
        timestamp = now.to_rfc3339(),
        debug = rng.random_bool(0.5),
        timeout = rng.random_range(1_000..=5_000),
        retries = rng.random_range(1..=5),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    // ── kinds and filenames ────────────────────────────────────────────

    #[test]
    fn test_extension_matches_kind() {
        assert_eq!(ContentKind::Markdown.extension(), ".md");
        assert_eq!(ContentKind::Json.extension(), ".json");
        assert_eq!(ContentKind::Text.extension(), ".txt");
        assert_eq!(ContentKind::Python.extension(), ".py");
        assert_eq!(ContentKind::JavaScript.extension(), ".js");
    }

    #[test]
    fn test_file_name_carries_extension_and_timestamp() {
        let mut rng = rng();
        let now = Local::now();
        for kind in ContentKind::ALL {
            let name = generate_file_name(kind, &mut rng, now);
            assert!(name.ends_with(kind.extension()), "bad name {}", name);
            assert!(
                name.contains(&now.format("%Y%m%d").to_string()),
                "no timestamp in {}",
                name
            );
        }
    }

    #[test]
    fn test_every_kind_produces_nonempty_body() {
        let mut rng = rng();
        let now = Local::now();
        for kind in ContentKind::ALL {
            let body = generate_body(kind, &mut rng, now);
            assert!(!body.is_empty(), "empty body for {:?}", kind);
        }
    }

    // ── json payload ───────────────────────────────────────────────────

    #[test]
    fn test_json_body_parses_with_valid_timestamp() {
        let mut rng = rng();
        let body = generate_body(ContentKind::Json, &mut rng, Local::now());
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let ts = value["metadata"]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(value["metadata"]["created_by"], "repopulse");
    }

    // ── stubs ──────────────────────────────────────────────────────────

    #[test]
    fn test_python_body_names_a_known_function() {
        let mut rng = rng();
        let body = generate_body(ContentKind::Python, &mut rng, Local::now());
        assert!(STUB_FUNCTIONS.iter().any(|f| body.contains(f)));
    }

    #[test]
    fn test_javascript_body_has_module_exports() {
        let mut rng = rng();
        let body = generate_body(ContentKind::JavaScript, &mut rng, Local::now());
        assert!(body.contains("module.exports"));
    }

    // ── write_generated ────────────────────────────────────────────────

    #[test]
    fn test_write_generated_creates_file_under_gen_contents() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = rng();
        let generated = write_generated(dir.path(), &mut rng).unwrap();

        assert!(generated.relative_path.starts_with("gen_contents/"));
        assert!(
            generated
                .relative_path
                .ends_with(generated.kind.extension())
        );

        let full = dir.path().join(&generated.relative_path);
        let body = std::fs::read_to_string(full).unwrap();
        assert!(!body.is_empty());
    }

    #[test]
    fn test_write_generated_fails_on_unwritable_base() {
        let mut rng = rng();
        // A file where a directory is expected makes create_dir_all fail.
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(write_generated(file.path(), &mut rng).is_err());
    }
}
