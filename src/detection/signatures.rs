//! Known automated-agent signatures.

/// Lowercase substrings that identify crawlers in a `User-Agent`.
pub const BOT_SIGNATURES: &[&str] = &[
    // Search engine crawlers
    "googlebot",
    "google-inspectiontool",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "sogou",
    "exabot",
    "facebot",
    "ia_archiver",
    // AI crawlers and trainers
    "gptbot",
    "chatgpt-user",
    "oai-searchbot",
    "claude-web",
    "claudebot",
    "anthropic-ai",
    "cohere-ai",
    "perplexitybot",
    "youbot",
    "ccbot",
    // Link preview fetchers
    "facebookexternalhit",
    "facebookcatalog",
    "twitterbot",
    "linkedinbot",
    "slackbot",
    "slack-imgproxy",
    "discordbot",
    "telegrambot",
    "whatsapp",
    "pinterestbot",
    "redditbot",
    // SEO tools
    "semrushbot",
    "ahrefsbot",
    "mj12bot",
    "dotbot",
    "rogerbot",
    "screaming frog",
    // Other indexers
    "applebot",
    "amazonbot",
    "bytespider",
];
