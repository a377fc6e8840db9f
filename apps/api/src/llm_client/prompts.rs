// Shared prompt fragments.
// The resume module defines its own prompts.rs alongside it; this file only holds
// cross-cutting instructions.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to extraction prompts so absent data stays absent.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Only extract what the document states. Do NOT invent employers, dates, \
    grades or contact details. A missing value is an empty string or an empty array, \
    never a guess.";
