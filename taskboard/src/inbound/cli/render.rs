//! Plain-text rendering of views, rosters and task lists.

use std::io::{self, Write};

use serde::Serialize;

use crate::domain::dashboard::{
    EmployeeDashboard, EmployeeLoad, ManagerDashboard, RecentTask, StatusTotals,
    SupervisorDashboard,
};
use crate::domain::{Dashboard, ShellView, Task, User};

/// Write `value` as pretty JSON followed by a newline.
pub(super) fn json(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::other)?;
    writeln!(out)
}

pub(super) fn view(out: &mut impl Write, view: &ShellView) -> io::Result<()> {
    match view {
        ShellView::Loading => writeln!(out, "Carregando..."),
        ShellView::InitialSetup => writeln!(
            out,
            "Configuração inicial: nenhum gerente cadastrado. Execute `taskboard setup`."
        ),
        ShellView::Login => writeln!(out, "Faça login com --email e --password."),
        ShellView::Dashboard(Dashboard::Employee(board)) => employee(out, board),
        ShellView::Dashboard(Dashboard::Supervisor(board)) => supervisor(out, board),
        ShellView::Dashboard(Dashboard::Manager(board)) => manager(out, board),
    }
}

pub(super) fn users(out: &mut impl Write, users: &[User]) -> io::Result<()> {
    for user in users {
        writeln!(
            out,
            "{}  {:<24} {:<28} {:<12} {}",
            user.id(),
            user.name(),
            user.email(),
            user.role().label(),
            user.department().unwrap_or("-"),
        )?;
    }
    Ok(())
}

pub(super) fn tasks(out: &mut impl Write, tasks: &[Task]) -> io::Result<()> {
    for task in tasks {
        task_line(out, task)?;
    }
    Ok(())
}

fn task_line(out: &mut impl Write, task: &Task) -> io::Result<()> {
    let due = task
        .due_date
        .map_or_else(|| "-".to_owned(), |due| due.format("%Y-%m-%d").to_string());
    writeln!(
        out,
        "{}  [{}] ({}) {}  prazo: {due}",
        task.id,
        task.status.label(),
        task.priority,
        task.title,
    )
}

fn totals(out: &mut impl Write, totals: &StatusTotals) -> io::Result<()> {
    writeln!(
        out,
        "Total: {}  Pendentes: {}  Em andamento: {}  Concluídas: {}",
        totals.total, totals.pending, totals.in_progress, totals.done
    )
}

fn workload(out: &mut impl Write, loads: &[EmployeeLoad]) -> io::Result<()> {
    for load in loads {
        writeln!(
            out,
            "  {:<24} pendentes {}  em andamento {}  concluídas {}",
            load.employee.name(),
            load.totals.pending,
            load.totals.in_progress,
            load.totals.done,
        )?;
    }
    Ok(())
}

fn recent(out: &mut impl Write, recent: &[RecentTask]) -> io::Result<()> {
    for entry in recent {
        writeln!(
            out,
            "  {} → {} [{}]",
            entry.task.title,
            entry.assignee_name,
            entry.task.status.label()
        )?;
    }
    Ok(())
}

fn employee(out: &mut impl Write, board: &EmployeeDashboard) -> io::Result<()> {
    writeln!(out, "Olá, {} ({})", board.user.name(), board.user.role().label())?;
    totals(out, &board.totals)?;
    for (heading, list) in [
        ("Pendentes", &board.pending),
        ("Em andamento", &board.in_progress),
        ("Concluídas", &board.done),
    ] {
        writeln!(out, "{heading}:")?;
        tasks(out, list)?;
    }
    Ok(())
}

fn supervisor(out: &mut impl Write, board: &SupervisorDashboard) -> io::Result<()> {
    writeln!(out, "Painel do supervisor")?;
    totals(out, &board.totals)?;
    writeln!(out, "Funcionários:")?;
    workload(out, &board.employees)?;
    writeln!(out, "Tarefas recentes:")?;
    recent(out, &board.recent)
}

fn manager(out: &mut impl Write, board: &ManagerDashboard) -> io::Result<()> {
    writeln!(out, "Painel do gerente")?;
    writeln!(
        out,
        "Usuários: {} funcionários, {} supervisores, {} gerentes",
        board.roles.employees, board.roles.supervisors, board.roles.managers
    )?;
    totals(out, &board.totals)?;
    writeln!(out, "Taxa de conclusão: {}%", board.completion_rate)?;
    writeln!(
        out,
        "Prioridade: baixa {}  média {}  alta {}",
        board.priorities.low, board.priorities.medium, board.priorities.high
    )?;
    writeln!(
        out,
        "Funcionários disponíveis: {}",
        board.available_employees.len()
    )?;
    writeln!(out, "Carga de trabalho:")?;
    workload(out, &board.workload)?;
    writeln!(out, "Atividade recente:")?;
    recent(out, &board.recent_activity)
}
