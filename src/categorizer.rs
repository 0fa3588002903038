/// Category assigned when no keyword matches.
pub const FALLBACK_CATEGORY: &str = "Other";

const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("Food", &["restaurante", "ifood", "rappi"]),
    ("Boteco", &["cerveja", "bar", "boteco", "chopp", "drink", "bebida", "magal"]),
    ("Supermercado", &["mercado", "supermercado", "pao", "acucar", "zona sul", "super"]),
    (
        "Transportation",
        &["uber", "99", "taxi", "combustivel", "gasolina", "estacionamento", "metro", "onibus", "rio card"],
    ),
    ("Housing", &["aluguel", "condominio", "agua", "luz", "energia", "gas"]),
    ("Entertainment", &["netflix", "spotify", "cinema", "teatro", "show", "tidal", "disney"]),
    (
        "Shopping",
        &["shopping", "loja", "magazine", "americanas", "amazon", "aliexpress", "parcela"],
    ),
    (
        "Health",
        &["farmacia", "medico", "consulta", "exame", "academia", "gym", "metavet", "raia", "droga"],
    ),
    ("Education", &["curso", "livro", "escola", "faculdade", "universidade"]),
    ("Bills", &["fatura", "conta", "telefone", "internet", "celular", "seguro"]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRule {
    pub name: String,
    /// Lowercase substrings.
    pub keywords: Vec<String>,
}

/// Ordered keyword table. The first rule with any matching keyword wins,
/// so declaration order decides ties.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::from_rules(DEFAULT_RULES.iter().map(|(name, keywords)| CategoryRule {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }))
    }
}

impl CategoryTable {
    pub fn from_rules(rules: impl IntoIterator<Item = CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule {
                keywords: r.keywords.iter().map(|k| k.to_lowercase()).collect(),
                name: r.name,
            })
            .collect();
        Self { rules }
    }

    /// Table categories in order, followed by the fallback.
    pub fn names(&self) -> Vec<&str> {
        self.rules
            .iter()
            .map(|r| r.name.as_str())
            .chain(std::iter::once(FALLBACK_CATEGORY))
            .collect()
    }

    pub fn categorize(&self, description: &str) -> &str {
        let desc = description.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| desc.contains(k.as_str())))
            .map_or(FALLBACK_CATEGORY, |rule| rule.name.as_str())
    }
}
