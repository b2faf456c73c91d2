use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad accounting direction a category implies. Used by analytics to
/// decide which side of a cash-flow report the category lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    #[default]
    Expense,
    Income,
    Transfer,
    Investment,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Expense => write!(f, "expense"),
            CategoryKind::Income => write!(f, "income"),
            CategoryKind::Transfer => write!(f, "transfer"),
            CategoryKind::Investment => write!(f, "investment"),
        }
    }
}

impl std::str::FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(CategoryKind::Expense),
            "income" => Ok(CategoryKind::Income),
            "transfer" => Ok(CategoryKind::Transfer),
            "investment" => Ok(CategoryKind::Investment),
            other => Err(format!("Unknown category kind: '{other}'")),
        }
    }
}

/// One classification rule: keyword substrings tried first, regex patterns
/// as a fallback for morphological variants the keyword list would have to
/// enumerate. Icon and color are display attributes carried for the
/// persisted table; the matcher ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub kind: CategoryKind,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

/// Ordered category table. Order is load-bearing: when two categories'
/// keyword sets both match a description, the earlier entry wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    pub categories: Vec<Category>,
}

fn cat(
    name: &str,
    kind: CategoryKind,
    icon: &str,
    color: &str,
    keywords: &[&str],
    patterns: &[&str],
) -> Category {
    Category {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
        kind,
        icon: icon.to_string(),
        color: color.to_string(),
    }
}

impl Taxonomy {
    /// Parse a deployment-supplied table. The TOML shape mirrors the
    /// serialized form: `[[categories]]` entries with name/keywords/
    /// patterns/kind/icon/color.
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        toml::from_str(toml_content).map_err(|e| format!("Failed to parse taxonomy TOML: {e}"))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The built-in table. Deployments normally seed storage from this once
    /// and load the (possibly user-edited) table back at startup.
    pub fn builtin() -> Self {
        use CategoryKind::*;
        Taxonomy {
            categories: vec![
                cat(
                    "Food & Dining", Expense, "🍔", "#ef4444",
                    &["swiggy", "zomato", "restaurant", "cafe", "food", "dining", "uber eats",
                      "dominos", "pizza", "mcdonalds", "kfc", "starbucks", "burger", "hotel",
                      "dhaba", "mess", "canteen", "kitchen", "biryani", "dine", "eatery",
                      "barbeque", "bbq", "brewpub", "pub"],
                    &["food|dine|eat|restaurant|cafe|bistro|pizzeria"],
                ),
                cat(
                    "Groceries", Expense, "🛒", "#22c55e",
                    &["bigbasket", "grofers", "blinkit", "dmart", "reliance fresh", "more",
                      "supermarket", "grocery", "vegetables", "fruits", "zepto", "instamart",
                      "jiomart", "nature basket", "spencer", "star bazaar", "hypermarket"],
                    &[r"grocery|grocer|vegetable|fruit|supermarket|mart\b"],
                ),
                cat(
                    "Shopping", Expense, "🛍️", "#8b5cf6",
                    &["amazon", "flipkart", "myntra", "ajio", "snapdeal", "shopping", "mall",
                      "retail", "clothes", "electronics", "meesho", "nykaa", "tata cliq",
                      "lifestyle", "pantaloons", "westside", "shoppers stop",
                      "reliance digital", "croma", "vijay sales"],
                    &["shop|store|retail|mall|boutique|mart$"],
                ),
                cat(
                    "Transportation", Expense, "🚗", "#3b82f6",
                    &["uber", "ola", "rapido", "petrol", "diesel", "fuel", "metro", "bus",
                      "train", "irctc", "redbus", "cab", "taxi", "iocl", "hpcl", "bpcl",
                      "indian oil", "bharat petroleum", "shell", "parking", "toll", "fastag",
                      "meru", "megacabs"],
                    &["fuel|petrol|diesel|cab|taxi|transport|metro|railway|toll|parking"],
                ),
                cat(
                    "Rent", Expense, "🏠", "#f59e0b",
                    &["rent", "lease", "housing", "accommodation", "pg", "hostel", "landlord",
                      "flat rent", "house rent", "monthly rent"],
                    &[r"\brent\b|lease|landlord|accommodation"],
                ),
                cat(
                    "Utilities", Expense, "💡", "#06b6d4",
                    &["electricity", "water", "gas", "internet", "broadband", "wifi", "jio",
                      "airtel", "vodafone", "bsnl", "bill", "recharge", "dth", "tata sky",
                      "dish tv", "piped gas", "mahanagar gas", "indraprastha gas",
                      "adani gas", "bescom", "mseb", "bses"],
                    &["electric|water bill|gas bill|internet|broadband|mobile|recharge|dth|cable"],
                ),
                cat(
                    "Entertainment", Expense, "🎬", "#ec4899",
                    &["netflix", "amazon prime", "hotstar", "spotify", "youtube", "movie",
                      "theatre", "pvr", "inox", "game", "play", "disney", "zee5", "sonyliv",
                      "voot", "aha", "bookmyshow", "paytm movies", "entertainment", "gaming",
                      "steam", "playstation", "xbox"],
                    &["movie|theatre|cinema|gaming|entertainment|streaming|concert|show|event"],
                ),
                cat(
                    "Healthcare", Expense, "🏥", "#14b8a6",
                    &["hospital", "doctor", "medicine", "pharmacy", "apollo", "medplus", "1mg",
                      "pharmeasy", "netmeds", "clinic", "medical", "health", "diagnostic",
                      "lab", "pathology", "dr.", "fortis", "max", "manipal", "aiims",
                      "dental", "eye", "optical"],
                    &["hospital|clinic|medical|pharmacy|health|doctor|diagnostic|pathology"],
                ),
                cat(
                    "Education", Expense, "📚", "#6366f1",
                    &["school", "college", "university", "course", "udemy", "coursera",
                      "books", "tuition", "fees", "education", "training", "coaching",
                      "institute", "academy", "unacademy", "byju", "vedantu", "whitehat",
                      "simplilearn", "upgrad"],
                    &["school|college|university|education|tuition|course|training|academy|coaching"],
                ),
                cat(
                    "Insurance", Expense, "🛡️", "#84cc16",
                    &["insurance", "lic", "hdfc life", "icici prudential", "premium",
                      "policy", "sbi life", "max life", "bajaj allianz", "tata aia",
                      "birla sun life", "health insurance", "term insurance",
                      "car insurance", "bike insurance"],
                    &[r"insurance|premium|policy|lic\b|life insurance|health cover"],
                ),
                cat(
                    "Investments", Investment, "📈", "#10b981",
                    &["mutual fund", "sip", "stock", "zerodha", "groww", "upstox",
                      "investment", "nps", "ppf", "fd", "fixed deposit", "mf", "nse", "bse",
                      "kuvera", "coin", "angel", "iifl", "motilal", "paytm money",
                      "et money", "scripbox", "rd", "recurring deposit"],
                    &["investment|sip|mutual fund|stock|nps|ppf|fixed deposit|trading"],
                ),
                cat(
                    "Salary", Income, "💰", "#22c55e",
                    &["salary", "wages", "payroll", "income", "earning", "stipend", "pay"],
                    &["salary|wages|payroll|stipend"],
                ),
                cat(
                    "Interest Credit", Income, "🏦", "#0ea5e9",
                    &["interest credit", "interest earned", "dividend", "bonus", "int cred",
                      "int.cred", "interest", "accrued interest"],
                    &[r"interest (credit|earned)|int\.cred|dividend"],
                ),
                cat(
                    "Refund", Income, "↩️", "#a855f7",
                    &["refund", "cashback", "reversal", "return", "refunded", "reversed",
                      "chargeback"],
                    &["refund|cashback|reversal|return|chargeback"],
                ),
                cat(
                    "Transfer", Transfer, "↔️", "#64748b",
                    &["transfer", "neft", "rtgs", "imps", "upi", "self transfer",
                      "fund transfer", "self trf", "own account"],
                    &["self transfer|own account|fund transfer|internal transfer"],
                ),
                cat(
                    "ATM Withdrawal", Expense, "🏧", "#78716c",
                    &["atm", "cash withdrawal", "withdrawal", "atm wdl", "cash wdl",
                      "atm-cwdr"],
                    &["atm|cash withdrawal|cash wdl"],
                ),
                cat(
                    "EMI", Expense, "📅", "#f97316",
                    &["emi", "loan", "installment", "repayment", "home loan", "car loan",
                      "personal loan", "education loan", "equated monthly", "emis"],
                    &[r"\bemi\b|loan repay|installment|equated monthly"],
                ),
                cat(
                    "Credit Card Payment", Transfer, "💳", "#0891b2",
                    &["credit card", "card payment", "cc payment", "card bill", "creditcard",
                      "cc bill", "credit card bill", "card due"],
                    &["credit card|card payment|cc (bill|payment)"],
                ),
                cat(
                    "Travel", Expense, "✈️", "#0284c7",
                    &["makemytrip", "goibibo", "cleartrip", "yatra", "air india", "indigo",
                      "spicejet", "vistara", "air asia", "airways", "airlines", "flight",
                      "booking", "hotel booking", "oyo", "airbnb", "trivago", "travel"],
                    &["flight|airline|airways|travel|booking|hotel"],
                ),
                cat(
                    "Subscriptions", Expense, "🔄", "#7c3aed",
                    &["subscription", "monthly", "annual", "yearly", "membership", "premium",
                      "plan", "subscribe"],
                    &["subscription|membership|monthly plan|annual plan"],
                ),
                cat(
                    "Personal Care", Expense, "💇", "#db2777",
                    &["salon", "spa", "parlour", "parlor", "beauty", "grooming", "haircut",
                      "facial", "massage", "urban company", "urbanclap"],
                    &["salon|spa|parlour|beauty|grooming|haircut"],
                ),
                cat(
                    "Donations", Expense, "❤️", "#dc2626",
                    &["donation", "charity", "ngo", "foundation", "trust", "relief", "fund",
                      "help", "covid"],
                    &["donation|charity|ngo|fund raising|relief fund"],
                ),
                cat(
                    "Taxes", Expense, "🧾", "#b45309",
                    &["tax", "income tax", "gst", "tds", "advance tax", "self assessment",
                      "challan", "cess"],
                    &[r"\btax\b|income tax|gst|tds|challan"],
                ),
                cat("Other", Expense, "📝", "#94a3b8", &[], &[]),
            ],
        }
    }
}
