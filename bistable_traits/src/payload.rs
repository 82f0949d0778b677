/// A value that can be hot-swapped by a double buffer.
///
/// Building a payload is two steps: [`construct`][Payload::construct] produces an instance from the
/// construction arguments, then [`init`][Payload::init] populates and validates it. Only an instance
/// whose `init` succeeded is ever published to readers. The same `Args` value, captured once when the
/// container is created, is handed to every build for the life of the container.
///
/// Once published, a payload is shared behind an [`Arc`][std::sync::Arc] and treated as read-only.
///
/// `construct` cannot fail. Anything that can (reading files, parsing, validating) belongs in
/// `init`: a container only learns about a failed build through the `Err` returned by `init`, and a
/// panic in `construct` is not a reported failure.
///
/// ```rust
/// # use bistable_traits::payload::Payload;
/// struct Dictionary {
///     source: String,
///     words: Vec<String>,
/// }
///
/// impl Payload for Dictionary {
///     type Args = String;
///     type Error = std::io::Error;
///
///     fn construct(args: &String) -> Self {
///         Dictionary { source: args.clone(), words: Vec::new() }
///     }
///
///     fn init(&mut self) -> Result<(), Self::Error> {
///         self.words = std::fs::read_to_string(&self.source)?
///             .lines()
///             .map(str::to_owned)
///             .collect();
///         Ok(())
///     }
/// }
/// ```
pub trait Payload: Sized + Send + Sync + 'static {
    /// Construction arguments, reused unmodified for every build.
    type Args: Send + Sync + 'static;
    /// Reason a build was rejected.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Produce an instance that has not been populated yet.
    ///
    /// Keep this cheap and infallible, for example by only copying what `init` needs out of
    /// `args`. Failures must be reported from [`init`][Payload::init].
    fn construct(args: &Self::Args) -> Self;

    /// Populate and validate the instance. An error here means the instance is discarded and the
    /// currently published payload stays in place.
    fn init(&mut self) -> Result<(), Self::Error>;
}
