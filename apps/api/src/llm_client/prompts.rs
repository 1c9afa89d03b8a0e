// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every extraction prompt so the model never fills gaps by guessing.
pub const NO_GUESSING_INSTRUCTION: &str = "\
    CRITICAL: Only report values that literally appear in the document. \
    Use an empty string, an empty list, or 0 when a field is absent. \
    Do NOT infer, interpolate, or invent details.";
