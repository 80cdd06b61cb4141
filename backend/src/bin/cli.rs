use anyhow::{bail, Context};
use chrono::{NaiveDate, Offset, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use planner_backend::auth::{create_token, AuthConfig};
use planner_shared::api::{
    CreateEventRequest, CreateTaskRequest, ErrorResponse, UpdateEventRequest, UpdateTaskRequest,
};
use planner_shared::calendar::{collisions, hour_separators};
use planner_shared::{
    parse_timestamp, CalendarDay, CalendarEvent, DragGesture, Event, Task, TaskItem,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "planner-cli")]
#[command(about = "CLI for managing tasks and calendar events via the planner API")]
#[command(
    long_about = "A command-line interface for the planner server.\n\n\
    Creates, lists, updates and deletes tasks and events, reschedules events the\n\
    way dragging them on a day column would, and prints a day agenda."
)]
struct Cli {
    /// Planner server URL to connect to.
    #[arg(
        short,
        long,
        default_value = "http://localhost:8080",
        env = "PLANNER_API_URL"
    )]
    base_url: String,

    /// Bearer token sent with every API request.
    ///
    /// Use the `token` command to mint one for local development.
    #[arg(long, env = "PLANNER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Height in pixels of the day column used for move, resize and day.
    #[arg(long, default_value_t = 960.0, global = true)]
    column_height: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a bearer token for a user id (needs the server's JWT_SECRET)
    Token {
        /// User id the token is issued for
        #[arg(short, long)]
        user: String,

        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,

        /// Token lifetime in days
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Manage tasks - create, list, update, schedule and mark as done
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Manage calendar events - create, list, update, move and resize
    Events {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Print the agenda of one day: events and scheduled tasks with their
    /// placement on the day column
    Day {
        /// The day to show, e.g. 2025-05-19
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// List all tasks
    ///
    /// Displays tasks with a checkbox indicator (○ open, ✓ done), their id,
    /// title, estimate and schedule.
    List,

    /// Create a new task
    Create {
        title: String,

        /// Estimated duration in minutes
        #[arg(short, long, default_value_t = 30)]
        estimate: i32,

        #[arg(short, long, value_name = "TEXT")]
        description: Option<String>,

        /// Due date, e.g. 2025-05-23
        #[arg(long, value_name = "TIMESTAMP")]
        due: Option<String>,

        /// Put the task on the calendar at this time
        #[arg(long, value_name = "TIMESTAMP")]
        at: Option<String>,
    },

    /// Update an existing task's fields. Only given fields change.
    Update {
        id: i32,

        #[arg(short, long, value_name = "TEXT")]
        title: Option<String>,

        #[arg(short, long, value_name = "TEXT")]
        description: Option<String>,

        /// Estimated duration in minutes
        #[arg(short, long)]
        estimate: Option<i32>,

        #[arg(long, value_name = "TIMESTAMP")]
        due: Option<String>,
    },

    /// Mark a task as done
    Done { id: i32 },

    /// Mark a task as not done (reopen)
    Undo { id: i32 },

    /// Put a task on the calendar
    Schedule {
        id: i32,

        /// Start time, e.g. 2025-05-19T08:00:00+02:00
        at: String,
    },

    /// Take a task off the calendar
    Unschedule { id: i32 },

    /// Permanently delete a task
    Delete { id: i32 },
}

#[derive(Subcommand)]
enum EventAction {
    /// List all events
    List,

    /// Create a new event
    Create {
        title: String,

        /// Start, e.g. 2025-05-19T08:30:00+02:00
        #[arg(long)]
        from: String,

        /// End, e.g. 2025-05-19T10:00:00+02:00
        #[arg(long)]
        to: String,

        #[arg(short, long, value_name = "TEXT")]
        description: Option<String>,
    },

    /// Update an existing event's fields. Only given fields change.
    Update {
        id: i32,

        #[arg(short, long, value_name = "TEXT")]
        title: Option<String>,

        #[arg(short, long, value_name = "TEXT")]
        description: Option<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// Drag an event to a new position, keeping its length
    Move {
        id: i32,

        /// New top edge, in pixels from the top of the column
        #[arg(long)]
        top: f64,

        /// Drop the event on another day
        #[arg(long)]
        day: Option<NaiveDate>,
    },

    /// Drag one edge of an event
    Resize {
        id: i32,

        #[arg(long, value_enum)]
        edge: Edge,

        /// New position of that edge, in pixels from the top of the column
        #[arg(long)]
        to: f64,
    },

    /// Permanently delete an event
    Delete { id: i32 },
}

#[derive(Clone, Copy, ValueEnum)]
enum Edge {
    Start,
    End,
}

impl From<Edge> for DragGesture {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Start => DragGesture::ResizeStart,
            Edge::End => DragGesture::ResizeEnd,
        }
    }
}

/// Thin client over the planner HTTP API.
struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let response = send(self.request(reqwest::Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let response = send(self.request(reqwest::Method::POST, path).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let response = send(self.request(reqwest::Method::PUT, path).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        send(self.request(reqwest::Method::DELETE, path)).await?;
        Ok(())
    }
}

/// Send a request and turn a non-2xx reply into an error carrying the
/// server's message.
async fn send(builder: RequestBuilder) -> anyhow::Result<reqwest::Response> {
    let response = builder.send().await.context("Failed to reach the planner server")?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<ErrorResponse>().await {
        Ok(ErrorResponse {
            error,
            details: Some(details),
        }) => bail!("{}: {} ({})", status, error, details),
        Ok(ErrorResponse { error, .. }) => bail!("{}: {}", status, error),
        Err(_) => bail!("{}", status),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.base_url, cli.token);

    match cli.command {
        Commands::Token { user, secret, days } => {
            let config = AuthConfig {
                jwt_secret: secret,
                token_duration_days: days,
                cookie_name: String::new(),
            };
            println!("{}", create_token(&config, &user)?);
        }
        Commands::Tasks { action } => handle_tasks(&api, action).await?,
        Commands::Events { action } => handle_events(&api, action, cli.column_height).await?,
        Commands::Day { date } => print_day(&api, date, cli.column_height).await?,
    }

    Ok(())
}

fn check_timestamp(value: &str) -> anyhow::Result<()> {
    parse_timestamp(value)?;
    Ok(())
}

fn print_task(prefix: &str, task: &Task) {
    let status = if task.done { "✓" } else { "○" };
    println!("{}{} [{}] {} ({} min)", prefix, status, task.id, task.title, task.estimated_time);
}

async fn handle_tasks(api: &ApiClient, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::List => {
            let tasks: Vec<Task> = api.get("/tasks").await?;
            if tasks.is_empty() {
                println!("No tasks found.");
            }
            for task in tasks {
                print_task("", &task);
                if !task.description.is_empty() {
                    println!("    {}", task.description);
                }
                if let Some(due) = &task.due_date {
                    println!("    Due: {}", due);
                }
                if let Some(at) = &task.scheduled_at {
                    println!("    Scheduled: {}", at);
                }
            }
        }
        TaskAction::Create {
            title,
            estimate,
            description,
            due,
            at,
        } => {
            for value in due.iter().chain(at.iter()) {
                check_timestamp(value)?;
            }
            let req = CreateTaskRequest {
                title,
                description: description.unwrap_or_default(),
                done: false,
                estimated_time: estimate,
                due_date: due,
                scheduled_at: at,
            };
            let task: Task = api.post("/tasks", &req).await?;
            print_task("Created task: ", &task);
        }
        TaskAction::Update {
            id,
            title,
            description,
            estimate,
            due,
        } => {
            if let Some(due) = &due {
                check_timestamp(due)?;
            }
            let req = UpdateTaskRequest {
                title,
                description,
                estimated_time: estimate,
                due_date: due.map(Some),
                ..Default::default()
            };
            let task: Task = api.put(&format!("/tasks/{}", id), &req).await?;
            print_task("Updated task: ", &task);
        }
        TaskAction::Done { id } => {
            let req = UpdateTaskRequest {
                done: Some(true),
                ..Default::default()
            };
            let task: Task = api.put(&format!("/tasks/{}", id), &req).await?;
            print_task("Marked as done: ", &task);
        }
        TaskAction::Undo { id } => {
            let req = UpdateTaskRequest {
                done: Some(false),
                ..Default::default()
            };
            let task: Task = api.put(&format!("/tasks/{}", id), &req).await?;
            print_task("Marked as not done: ", &task);
        }
        TaskAction::Schedule { id, at } => {
            check_timestamp(&at)?;
            let req = UpdateTaskRequest {
                scheduled_at: Some(Some(at)),
                ..Default::default()
            };
            let task: Task = api.put(&format!("/tasks/{}", id), &req).await?;
            print_task("Scheduled: ", &task);
        }
        TaskAction::Unschedule { id } => {
            let req = UpdateTaskRequest {
                scheduled_at: Some(None),
                ..Default::default()
            };
            let task: Task = api.put(&format!("/tasks/{}", id), &req).await?;
            print_task("Unscheduled: ", &task);
        }
        TaskAction::Delete { id } => {
            api.delete(&format!("/tasks/{}", id)).await?;
            println!("Deleted task: {}", id);
        }
    }

    Ok(())
}

fn print_event(prefix: &str, event: &Event) {
    println!("{}[{}] {} ({} - {})", prefix, event.id, event.title, event.from, event.to);
}

async fn fetch_event(api: &ApiClient, id: i32) -> anyhow::Result<CalendarEvent> {
    let event: Event = api.get(&format!("/events/{}", id)).await?;
    Ok(CalendarEvent::from_wire(&event)?)
}

async fn handle_events(
    api: &ApiClient,
    action: EventAction,
    column_height: f64,
) -> anyhow::Result<()> {
    match action {
        EventAction::List => {
            let events: Vec<Event> = api.get("/events").await?;
            if events.is_empty() {
                println!("No events found.");
            }
            for event in events {
                print_event("", &event);
                if !event.description.is_empty() {
                    println!("    {}", event.description);
                }
            }
        }
        EventAction::Create {
            title,
            from,
            to,
            description,
        } => {
            check_timestamp(&from)?;
            check_timestamp(&to)?;
            let req = CreateEventRequest {
                title,
                description: description.unwrap_or_default(),
                from,
                to,
            };
            let event: Event = api.post("/events", &req).await?;
            print_event("Created event: ", &event);
        }
        EventAction::Update {
            id,
            title,
            description,
            from,
            to,
        } => {
            for value in from.iter().chain(to.iter()) {
                check_timestamp(value)?;
            }
            let req = UpdateEventRequest {
                title,
                description,
                from,
                to,
            };
            let event: Event = api.put(&format!("/events/{}", id), &req).await?;
            print_event("Updated event: ", &event);
        }
        EventAction::Move { id, top, day } => {
            let current = fetch_event(api, id).await?;
            let mut payload = current.to_drag_payload(column_height, top);
            payload.top = top;
            if let Some(date) = day {
                payload.day = CalendarDay::new(date, payload.day.offset);
            }

            let moved = current.dragged(&payload, column_height);
            let event: Event = api
                .put(&format!("/events/{}", id), &moved.to_update_request())
                .await?;
            print_event("Moved event: ", &event);
        }
        EventAction::Resize { id, edge, to } => {
            let mut current = fetch_event(api, id).await?;
            let mut payload = current.to_drag_payload(column_height, to);
            let bottom = payload.top + payload.height;
            match edge {
                Edge::Start => {
                    payload.top = to;
                    payload.height = bottom - to;
                }
                Edge::End => payload.height = to - payload.top,
            }
            if payload.height < 0.0 {
                bail!("Resizing past the opposite edge would end the event before it starts");
            }

            current.update_with_drag(edge.into(), &payload, column_height);
            let event: Event = api
                .put(&format!("/events/{}", id), &current.to_update_request())
                .await?;
            print_event("Resized event: ", &event);
        }
        EventAction::Delete { id } => {
            api.delete(&format!("/events/{}", id)).await?;
            println!("Deleted event: {}", id);
        }
    }

    Ok(())
}

async fn print_day(api: &ApiClient, date: NaiveDate, column_height: f64) -> anyhow::Result<()> {
    let events: Vec<Event> = api.get("/events").await?;
    let tasks: Vec<Task> = api.get("/tasks").await?;

    let mut blocks = Vec::new();
    for event in &events {
        blocks.push(CalendarEvent::from_wire(event)?);
    }
    for task in &tasks {
        if let Some(block) = TaskItem::from_wire(task)?.to_calendar_event() {
            blocks.push(block);
        }
    }
    blocks.retain(|block| CalendarDay::of(&block.from).date == date);
    blocks.sort_by_key(|block| block.from);

    let offset = blocks
        .first()
        .map(|block| *block.from.offset())
        .unwrap_or_else(|| Utc.fix());
    let lanes = collisions(&blocks.iter().map(CalendarEvent::span).collect::<Vec<_>>());

    println!("{}", date);
    if blocks.is_empty() {
        println!("Nothing planned.");
        return Ok(());
    }

    let mut remaining = blocks.iter().zip(lanes).peekable();
    for separator in hour_separators(CalendarDay::new(date, offset)) {
        println!("{} {:─<40}", separator.label, "");
        let hour_end = separator.time.checked_add_signed(chrono::Duration::hours(1));
        while let Some((block, lane)) =
            remaining.next_if(|(block, _)| hour_end.map_or(true, |end| block.from < end))
        {
            print_block(block, lane, column_height);
        }
    }
    // Blocks written in another offset can fall past the last gridline
    for (block, lane) in remaining {
        print_block(block, lane, column_height);
    }

    Ok(())
}

fn print_block(block: &CalendarEvent, lane: usize, column_height: f64) {
    let percent = block.percent_span();
    let pixels = block.pixel_span(column_height);
    let kind = if block.is_task() { "task" } else { "event" };
    println!(
        "      {} {} [{}] {}  {:.1}%-{:.1}%  {:.0}px-{:.0}px  lane {}",
        block.from.format("%H:%M"),
        kind,
        block.id.map(|id| id.to_string()).unwrap_or_default(),
        block.title,
        percent.from,
        percent.to,
        pixels.from,
        pixels.to,
        lane
    );
}
