//! Template library categories.

crate::define_text_enum! {
    /// Library shelf a template is filed under.
    TemplateCategory("template category") {
        Contracts = "Contracts",
        Letters = "Letters",
        Reports = "Reports",
        Forms = "Forms",
        Legal = "Legal",
        Proposals = "Proposals",
        Invoices = "Invoices",
        Other = "Other",
    }
}
