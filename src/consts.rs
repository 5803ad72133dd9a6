//! Project-wide constants.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Free queries an anonymous caller gets per quota window.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Length of the rolling quota window, in hours.
pub const QUOTA_WINDOW_HOURS: i64 = 24;

/// Store key holding the visitor's quota record. Same key the website's
/// browser client uses in local storage.
pub const QUOTA_STORAGE_KEY: &str = "adalcci_visitor_searches";

pub const PRIMARY_PROVIDER: &str = "primary";
pub const FALLBACK_PROVIDER: &str = "fallback";

pub const DEFAULT_PRIMARY_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_FALLBACK_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_FALLBACK_MODEL: &str = "google/gemini-3-flash-preview";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Upstream request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Returned in place of an empty completion.
pub const EMPTY_COMPLETION_PLACEHOLDER: &str =
    "I couldn't generate a response. Please try again.";

/// History rows shown by `concierge history` when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// System prompt sent ahead of every visitor query.
pub const STUDIO_CONTEXT: &str = r#"You are an AI assistant for Adalcci Interior, a premier interior design studio based in Lagos, Nigeria.

COMPANY INFORMATION:
- Name: Adalcci Interior
- Founded: 2015 by Sarah Mitchell
- Location: 25th, Paul Street, Abule-Egba, Lagos State
- Phone: +234 816 899 8902 / +234 706 193 8080
- Email: adalcciglobal@gmail.com

SERVICES OFFERED:
1. Interior Design - Complete interior design solutions from concept to completion
2. Space Planning - Strategic space optimization and furniture layout
3. Renovation - Comprehensive renovation and remodeling services
4. 3D Visualization - Photorealistic renderings and virtual walkthroughs
5. Design Consultation - Expert guidance and design direction

PORTFOLIO HIGHLIGHTS:
- Modern Minimalist Living (Victoria Island) - Residential
- Luxury Master Suite (Ikoyi) - Bedroom design
- Contemporary Kitchen (Lekki) - Kitchen renovation
- Executive Office (Marina) - Commercial office
- Boutique Hotel Lobby (Ikeja) - Hospitality
- Spa Retreat (Banana Island) - Wellness space

INSTRUCTIONS:
1. For interior design questions, provide detailed, helpful answers based on industry knowledge
2. For general knowledge questions, answer accurately and informatively
3. When relevant, subtly mention Adalcci's services as a solution
4. Be professional, friendly, and helpful
5. For pricing questions, explain that pricing varies by project and recommend booking a consultation
6. Keep responses concise but informative (2-4 paragraphs)"#;

/// Default database path: `~/.concierge/concierge.db`.
/// Single DB for the quota store and search history.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".concierge").join("concierge.db"))
}
