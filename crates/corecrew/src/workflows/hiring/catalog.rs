use serde::Serialize;

use super::questions::normalize_position;

/// Published job opening shown on the careers pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionRecord {
    pub key: &'static str,
    pub title: &'static str,
    pub posted: &'static str,
    pub description: &'static str,
    pub location: &'static str,
    pub employment_type: &'static str,
    pub pay: &'static str,
    pub experience: &'static str,
    pub benefits: Vec<&'static str>,
    pub applicants: u32,
    pub category: &'static str,
}

#[derive(Debug)]
pub struct PositionCatalog {
    positions: Vec<PositionRecord>,
}

impl PositionCatalog {
    pub fn standard() -> Self {
        Self {
            positions: standard_positions(),
        }
    }

    pub fn positions(&self) -> &[PositionRecord] {
        &self.positions
    }

    pub fn get(&self, key: &str) -> Option<&PositionRecord> {
        self.positions.iter().find(|position| position.key == key)
    }

    /// Match a submitted position against catalog keys first, then normalized titles.
    ///
    /// Free-text positions that match neither return `None`; the wizard keeps them verbatim.
    pub fn resolve(&self, submitted: &str) -> Option<&PositionRecord> {
        let trimmed = submitted.trim();
        if let Some(position) = self.get(trimmed) {
            return Some(position);
        }
        let wanted = normalize_position(trimmed);
        self.positions
            .iter()
            .find(|position| normalize_position(position.title) == wanted)
    }
}

fn standard_positions() -> Vec<PositionRecord> {
    vec![
        PositionRecord {
            key: "logistics-coordinator",
            title: "Logistics Coordinator / Dispatcher",
            posted: "one month ago",
            description: "Coordinate and dispatch logistics operations, ensuring timely delivery and efficient scheduling. Communicate with drivers and clients to resolve issues.",
            location: "Bakersfield, CA",
            employment_type: "Full-time / Part-time",
            pay: "$65-80 per hour",
            experience: "3-5 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Flexible Schedule"],
            applicants: 18,
            category: "Logistics",
        },
        PositionRecord {
            key: "supply-chain-analyst",
            title: "Supply Chain Analyst",
            posted: "one month ago",
            description: "Analyze supply chain data, identify trends, and recommend process improvements. Work with teams to optimize inventory and logistics operations.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$75-85 per hour",
            experience: "2-4 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Remote Work"],
            applicants: 22,
            category: "Analytics",
        },
        PositionRecord {
            key: "customer-support-client-relations",
            title: "Customer Support / Client Relations",
            posted: "2 week ago",
            description: "Provide outstanding customer service, assist with inquiries, and resolve client issues. Maintain positive relationships and ensure client satisfaction.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$65-80 per hour",
            experience: "Entry level",
            benefits: vec!["Health Insurance", "Employee Discounts", "Flexible Schedule"],
            applicants: 45,
            category: "Customer Service",
        },
        PositionRecord {
            key: "hr-recruitment",
            title: "HR / Recruitment / Talent Acquisition",
            posted: "4 days ago",
            description: "Manage the recruitment process, conduct interviews, and onboard new hires. Develop talent acquisition strategies and support HR operations.",
            location: "Chicago, IL",
            employment_type: "Full-time / Part-time",
            pay: "$75-85 per hour",
            experience: "2+ years",
            benefits: vec!["Health Insurance", "401(k) Match", "Professional Development"],
            applicants: 14,
            category: "Human Resources",
        },
        PositionRecord {
            key: "it-software-support",
            title: "IT / Software Support",
            posted: "three weeks ago",
            description: "Provide technical support for logistics and warehouse software systems. Troubleshoot issues and assist staff with IT needs.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$65-80 per hour",
            experience: "1-3 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Remote Work"],
            applicants: 11,
            category: "IT",
        },
        PositionRecord {
            key: "drivers",
            title: "Drivers (truck, delivery, fleet)",
            posted: "a week ago",
            description: "Deliver goods safely and on time. Maintain vehicle logs, inspect vehicles, and follow company safety policies. CDL preferred for truck drivers.",
            location: "Milwaukee, WI",
            employment_type: "Full-time / Part-time",
            pay: "$45-65 per hour",
            experience: "1-2 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Mileage Reimbursement"],
            applicants: 32,
            category: "Logistics",
        },
        PositionRecord {
            key: "warehouse-staff-forklift",
            title: "Warehouse Staff & Forklift Operators",
            posted: "a week ago",
            description: "Manage inventory, pick/pack orders, and operate forklifts. Ensure a safe and organized warehouse environment.",
            location: "Bakersfield, CA",
            employment_type: "Full-time / Part-time",
            pay: "$35-50 per hour",
            experience: "1-2 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Shift Differentials"],
            applicants: 28,
            category: "Warehouse",
        },
        PositionRecord {
            key: "fleet-maintenance-supervisors",
            title: "Fleet & Maintenance Supervisors",
            posted: "a week ago",
            description: "Supervise fleet maintenance operations, schedule vehicle servicing, and manage maintenance staff. Ensure compliance with safety standards.",
            location: "Bakersfield, CA",
            employment_type: "Full-time / Part-time",
            pay: "$60-70 per hour",
            experience: "3-5 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Continuing Education"],
            applicants: 12,
            category: "Logistics",
        },
        PositionRecord {
            key: "virtual-assistance",
            title: "Virtual Assistance",
            posted: "6 days ago",
            description: "Provide remote administrative support, manage schedules, handle email correspondence, and assist with day-to-day operations.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$35-50 per hour",
            experience: "Entry level",
            benefits: vec!["Health Insurance", "401(k) Match", "Remote Work"],
            applicants: 38,
            category: "Admin",
        },
        PositionRecord {
            key: "account-manager",
            title: "Account Manager",
            posted: "a month ago",
            description: "Oversee client accounts, manage relationships, and coordinate with internal teams to ensure customer satisfaction.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$65-80 per hour",
            experience: "2-4 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Flexible Schedule"],
            applicants: 17,
            category: "Customer Service",
        },
        PositionRecord {
            key: "project-manager",
            title: "Project Manager",
            posted: "two weeks ago",
            description: "Lead logistics and warehouse projects from initiation to completion. Manage teams, track milestones, and ensure project goals are met.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$65-80 per hour",
            experience: "3-5 years",
            benefits: vec!["Health Insurance", "401(k) Match", "Professional Development"],
            applicants: 15,
            category: "Management",
        },
        PositionRecord {
            key: "data-entry",
            title: "Data Entry",
            posted: "a month ago",
            description: "Accurately input logistics and warehouse data into electronic systems. Ensure data integrity and compliance with regulations.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$60-80 per hour",
            experience: "Entry level",
            benefits: vec!["Health Insurance", "401(k) Match", "Remote Work"],
            applicants: 38,
            category: "Admin",
        },
        PositionRecord {
            key: "customer-support",
            title: "Customer Support",
            posted: "6 weeks ago",
            description: "Assist customers with inquiries, process orders, and resolve issues. Provide excellent service and maintain a positive company image.",
            location: "Remote",
            employment_type: "Full-time / Part-time",
            pay: "$60-75 per hour",
            experience: "Entry level",
            benefits: vec!["Health Insurance", "Employee Discounts", "Flexible Schedule"],
            applicants: 45,
            category: "Customer Service",
        },
    ]
}
