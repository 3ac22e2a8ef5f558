#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a dimension's lower bound exceeds its upper bound.
    #[error("invalid bounds for dimension {dim}: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The dimension index.
        dim: usize,
        /// The lower bound value.
        low: usize,
        /// The upper bound value.
        high: usize,
    },

    /// Returned when a categorical variable is declared without categories.
    #[error("variable '{name}' has no categories")]
    EmptyChoices {
        /// The name of the offending variable.
        name: String,
    },

    /// Returned when the search space contains variables the optimizer cannot handle.
    #[error("unsupported search space: {reason}")]
    UnsupportedSearchSpace {
        /// Why the space was rejected.
        reason: String,
    },

    /// Returned when a radius is registered with `min < init <= max` violated.
    #[error(
        "invalid radius for '{variable_type}': requires min ({min}) < init ({init}) <= max ({max})"
    )]
    InvalidRadius {
        /// The variable-type class the radius belongs to.
        variable_type: String,
        /// The minimum radius.
        min: usize,
        /// The maximum radius.
        max: usize,
        /// The initial radius.
        init: usize,
    },

    /// Returned when a required radius was never registered.
    #[error("trust region has no radius registered for '{0}'")]
    MissingRadius(String),

    /// Returned when a trust region is used before a center was set.
    #[error("trust region has no center; call set_center first")]
    MissingCenter,

    /// Returned when population parameters violate `num_elite <= num_parents <= pop_size`.
    #[error(
        "invalid population: requires num_elite ({num_elite}) <= num_parents ({num_parents}) <= pop_size ({pop_size}) with at least one parent"
    )]
    InvalidPopulation {
        /// The population size.
        pop_size: usize,
        /// The number of parents.
        num_parents: usize,
        /// The number of elite samples, after rounding up to an even number.
        num_elite: usize,
    },

    /// Returned when a batch size or horizon parameter is zero.
    #[error("invalid {name}: must be positive")]
    InvalidBatchSize {
        /// The name of the parameter.
        name: &'static str,
    },

    /// Returned when more suggestions are requested than one generation holds.
    #[error("requested {requested} suggestions but the population only holds {pop_size}")]
    BatchTooLarge {
        /// The number of suggestions requested.
        requested: usize,
        /// The population size.
        pop_size: usize,
    },

    /// Returned when more initial points are supplied than a population holds.
    #[error("{got} initial points must be fewer than the population size {pop_size}")]
    TooManyInitialPoints {
        /// The number of points supplied.
        got: usize,
        /// The population size.
        pop_size: usize,
    },

    /// Returned when a sample has the wrong number of coordinates.
    #[error("dimension mismatch: expected {expected} dimensions but got {got}")]
    DimensionMismatch {
        /// The expected number of dimensions.
        expected: usize,
        /// The actual number of dimensions.
        got: usize,
    },

    /// Returned when observed points and objective values differ in length.
    #[error("observation mismatch: {n_x} points but {n_y} objective values")]
    ObservationMismatch {
        /// The number of points.
        n_x: usize,
        /// The number of objective values.
        n_y: usize,
    },

    /// Returned when a structured point holds a value outside its variable's domain.
    #[error("unknown category '{value}' for variable '{name}'")]
    UnknownCategory {
        /// The variable name.
        name: String,
        /// The value that could not be encoded.
        value: String,
    },

    /// Returned when an encoded coordinate lies outside its dimension's bounds.
    #[error("encoded value {value} is outside [{low}, {high}] in dimension {dim}")]
    OutOfBounds {
        /// The dimension index.
        dim: usize,
        /// The offending value.
        value: usize,
        /// The lower bound.
        low: usize,
        /// The upper bound.
        high: usize,
    },
}

pub type Result<T> = core::result::Result<T, Error>;
