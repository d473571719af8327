use anyhow::anyhow;

/// Simulates whether an in-memory driven port can reach its backing service. In-memory
/// fakes check this first so tests can exercise outage paths.
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    /// Return an error if connectivity is in a "disconnected" state
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not connect to service!")),
        }
    }
}

/// Records the arguments of every call made to a mocked function and hands back a
/// preconfigured return value. Mock driving ports hold one of these per trait method.
///
/// * [Args] is the tuple of captured arguments
/// * [Ret] is the type handed back to the caller
///
/// # Example
///
/// ```ignore
/// struct MockTaskService {
///     delete_task_result: FakeImplementation<(Uuid, i32), Result<(), TaskError>>,
/// }
///
/// impl TaskPort for Mutex<MockTaskService> {
///     async fn delete_task(&self, owner_id: Uuid, task_id: i32, ...) -> Result<(), TaskError> {
///         let mut locked = self.lock().expect("mock mutex poisoned");
///         locked.delete_task_result.save_arguments((owner_id, task_id));
///         locked.delete_task_result.return_value_result()
///     }
/// }
/// ```
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Returns the list of arguments passed on every call to this FakeImplementation
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

impl<Args, Success, Fail> FakeImplementation<Args, Result<Success, Fail>>
where
    Success: Clone,
    Fail: Clone,
{
    /// Configure the result handed back on every call. Errors must be [Clone]; domain error
    /// enums get a test-only Clone impl for this purpose.
    pub fn set_returned_result(&mut self, return_value: Result<Success, Fail>) {
        self.return_value = Some(return_value);
    }

    pub fn return_value_result(&self) -> Result<Success, Fail> {
        match self.return_value {
            Some(Ok(ref ok_result)) => Ok(ok_result.clone()),
            Some(Err(ref err)) => Err(err.clone()),
            None => panic!("Tried to return from a function where the return value wasn't set!"),
        }
    }
}

impl<Args, Success> FakeImplementation<Args, anyhow::Result<Success>>
where
    Success: Clone,
{
    /// Variant of [FakeImplementation::set_returned_result] for [anyhow::Result], since
    /// [anyhow::Error] is not [Clone]. Errors are re-created from their message.
    pub fn set_returned_anyhow(&mut self, return_value: anyhow::Result<Success>) {
        match return_value {
            Ok(ok_result) => self.return_value = Some(Ok(ok_result)),
            Err(err) => self.return_value = Some(Err(anyhow!(format!("{}", err)))),
        }
    }

    pub fn return_value_anyhow(&self) -> anyhow::Result<Success> {
        match self.return_value {
            None => panic!("Tried to return from a function where the value wasn't set!"),
            Some(Ok(ref ok_result)) => Ok(ok_result.clone()),
            Some(Err(ref err)) => Err(anyhow!(format!("{}", err))),
        }
    }
}
