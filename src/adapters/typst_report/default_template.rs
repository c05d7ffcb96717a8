//! Built-in Typst dashboard template with `{{PLACEHOLDER}}` markers.

/// Placeholders understood by [`super::resolve`].
pub const PLACEHOLDERS: &[&str] = &[
    "{{GENERATED_AT}}",
    "{{NOTICES}}",
    "{{WATCHLIST_TABLE}}",
    "{{POSITIONS_TABLE}}",
    "{{PNL_TOTALS}}",
    "{{PRICE_CHARTS}}",
    "{{TRADE_LOG}}",
];

const TEMPLATE: &str = r#"#set page(paper: "a4", margin: 1.5cm, flipped: true)
#set text(size: 9pt)

= Watchlist Dashboard

Generated {{GENERATED_AT}}

{{NOTICES}}

== Watchlist Signals

{{WATCHLIST_TABLE}}

== Positions

{{POSITIONS_TABLE}}

{{PNL_TOTALS}}

== Price History

{{PRICE_CHARTS}}

== Trade Log

{{TRADE_LOG}}
"#;

pub fn template() -> &'static str {
    TEMPLATE
}
