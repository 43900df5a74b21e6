/// Operators a node with children may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`: identity or sum
    Plus,
    /// `-`: negation or difference
    Minus,
    /// `*`
    Multiply,
    /// `/`, NaN on a zero divisor
    Divide,
    /// `$`: sum of the integers in an inclusive range
    RangeSum,
    /// `=`: variable assignment
    Assign,
    Min,
    Max,
    Average,
    Median,
    /// Empty token wrapping a single child, as in `((a))`
    Group,
}

/// How many operands an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// Human readable description for error messages
    pub fn describe(self) -> String {
        match self {
            Arity::Exactly(n) => n.to_string(),
            Arity::Between(lo, hi) => format!("{} or {}", lo, hi),
            Arity::AtLeast(n) => format!("at least {}", n),
        }
    }
}

impl Operator {
    /// Every operator with its token
    pub const ALL: [(&'static str, Operator); 11] = [
        ("+", Operator::Plus),
        ("-", Operator::Minus),
        ("*", Operator::Multiply),
        ("/", Operator::Divide),
        ("$", Operator::RangeSum),
        ("=", Operator::Assign),
        ("min", Operator::Min),
        ("max", Operator::Max),
        ("average", Operator::Average),
        ("median", Operator::Median),
        ("", Operator::Group),
    ];

    /// Looks up an operator by its exact, case-sensitive token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Operator::Plus),
            "-" => Some(Operator::Minus),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            "$" => Some(Operator::RangeSum),
            "=" => Some(Operator::Assign),
            "min" => Some(Operator::Min),
            "max" => Some(Operator::Max),
            "average" => Some(Operator::Average),
            "median" => Some(Operator::Median),
            "" => Some(Operator::Group),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::RangeSum => "$",
            Operator::Assign => "=",
            Operator::Min => "min",
            Operator::Max => "max",
            Operator::Average => "average",
            Operator::Median => "median",
            Operator::Group => "",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Operator::Plus | Operator::Minus => Arity::Between(1, 2),
            Operator::Multiply | Operator::Divide | Operator::RangeSum | Operator::Assign => {
                Arity::Exactly(2)
            }
            Operator::Min | Operator::Max | Operator::Average | Operator::Median => {
                Arity::AtLeast(1)
            }
            Operator::Group => Arity::Exactly(1),
        }
    }
}
